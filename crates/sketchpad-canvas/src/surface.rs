//! Drawing Surfaces
//!
//! A [`Surface`] is a freshly scoped drawing target bound to exactly one
//! execution. Each surface lives in an invisible container registered with
//! the [`SurfaceFactory`] that created it; the container is released when the
//! surface is disposed, on every exit path including unwinding.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::element::Element;
use crate::error::Result;
use crate::svg;
use crate::viewport::ViewportSize;

/// Bookkeeping shared between a factory and the containers it hands out
#[derive(Debug, Default)]
struct ContainerRegistry {
    attached: AtomicUsize,
    created: AtomicU64,
    released: AtomicU64,
}

/// Creates surfaces sized to a viewport
#[derive(Debug, Clone, Default)]
pub struct SurfaceFactory {
    registry: Arc<ContainerRegistry>,
}

impl SurfaceFactory {
    /// Create a new factory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh surface for one execution
    pub fn create(&self, viewport: &ViewportSize) -> Result<Surface> {
        viewport.validate()?;

        let container = Container::attach(Arc::clone(&self.registry));
        debug!(
            surface_id = %container.id,
            width = viewport.width,
            height = viewport.height,
            "Surface created"
        );

        Ok(Surface {
            viewport: viewport.clone(),
            elements: Vec::new(),
            container,
        })
    }

    /// Number of containers currently attached (created but not disposed)
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.registry.attached.load(Ordering::SeqCst)
    }

    /// Total surfaces created by this factory
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.registry.created.load(Ordering::SeqCst)
    }

    /// Total surfaces disposed
    #[must_use]
    pub fn disposed_count(&self) -> u64 {
        self.registry.released.load(Ordering::SeqCst)
    }
}

/// Scoped, invisible container. Releasing happens in `Drop`, so it runs
/// exactly once per container regardless of how the owner exits.
#[derive(Debug)]
struct Container {
    id: Uuid,
    registry: Arc<ContainerRegistry>,
}

impl Container {
    fn attach(registry: Arc<ContainerRegistry>) -> Self {
        registry.attached.fetch_add(1, Ordering::SeqCst);
        registry.created.fetch_add(1, Ordering::SeqCst);
        Self {
            id: Uuid::new_v4(),
            registry,
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.registry.attached.fetch_sub(1, Ordering::SeqCst);
        self.registry.released.fetch_add(1, Ordering::SeqCst);
        trace!(surface_id = %self.id, "Surface container released");
    }
}

/// The values a script's capability object is bound to
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBinding {
    /// Surface identifier
    pub surface_id: Uuid,
    /// Logical width (inches)
    pub width: f64,
    /// Logical height (inches)
    pub height: f64,
    /// Pixel width at 96 DPI
    pub pixel_width: f64,
    /// Pixel height at 96 DPI
    pub pixel_height: f64,
}

/// A drawing target bound to one execution
#[derive(Debug)]
pub struct Surface {
    viewport: ViewportSize,
    elements: Vec<Element>,
    container: Container,
}

impl Surface {
    /// Surface identifier
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.container.id
    }

    /// Viewport this surface was sized to
    #[must_use]
    pub fn viewport(&self) -> &ViewportSize {
        &self.viewport
    }

    /// Binding for the capability object handed to a script
    #[must_use]
    pub fn binding(&self) -> SurfaceBinding {
        SurfaceBinding {
            surface_id: self.container.id,
            width: self.viewport.width,
            height: self.viewport.height,
            pixel_width: self.viewport.pixel_width(),
            pixel_height: self.viewport.pixel_height(),
        }
    }

    /// Draw one element
    pub fn draw(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Draw a batch of elements in order
    pub fn draw_all(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }

    /// Remove everything drawn so far
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Elements drawn so far
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Serialize the surface contents to markup
    #[must_use]
    pub fn serialize(&self) -> String {
        svg::serialize_elements(&self.elements)
    }

    /// Release the surface and its container
    pub fn dispose(self) {
        debug!(surface_id = %self.container.id, "Surface disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Style;

    #[test]
    fn test_create_and_dispose() {
        let factory = SurfaceFactory::new();
        let surface = factory.create(&ViewportSize::letter()).unwrap();
        assert_eq!(factory.attached_count(), 1);

        surface.dispose();
        assert_eq!(factory.attached_count(), 0);
        assert_eq!(factory.created_count(), 1);
        assert_eq!(factory.disposed_count(), 1);
    }

    #[test]
    fn test_released_on_panic() {
        let factory = SurfaceFactory::new();
        let cloned = factory.clone();
        let result = std::panic::catch_unwind(move || {
            let _surface = cloned.create(&ViewportSize::letter()).unwrap();
            panic!("script host failure");
        });
        assert!(result.is_err());
        assert_eq!(factory.attached_count(), 0);
        assert_eq!(factory.disposed_count(), 1);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let factory = SurfaceFactory::new();
        assert!(factory
            .create(&ViewportSize::new(0.0, 4.0, "flat"))
            .is_err());
        assert_eq!(factory.created_count(), 0);
    }

    #[test]
    fn test_binding_scales_at_96_dpi() {
        let factory = SurfaceFactory::new();
        let surface = factory.create(&ViewportSize::new(6.0, 4.0, "6x4")).unwrap();
        let binding = surface.binding();
        assert_eq!(binding.width, 6.0);
        assert_eq!(binding.pixel_width, 576.0);
        assert_eq!(binding.pixel_height, 384.0);
        assert_eq!(binding.surface_id, surface.id());
    }

    #[test]
    fn test_surfaces_do_not_share_state() {
        let factory = SurfaceFactory::new();
        let mut first = factory.create(&ViewportSize::letter()).unwrap();
        first.draw(Element::circle(1.0, 1.0, 0.5, Style::default()));

        let second = factory.create(&ViewportSize::letter()).unwrap();
        assert!(second.elements().is_empty());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_clear() {
        let factory = SurfaceFactory::new();
        let mut surface = factory.create(&ViewportSize::letter()).unwrap();
        surface.draw(Element::rect(0.0, 0.0, 1.0, 1.0, Style::fill("red")));
        surface.clear();
        assert_eq!(surface.serialize(), "");
    }
}
