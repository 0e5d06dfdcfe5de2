//! `sketchpad doctor`

use sketchpad_core::ProjectStore;

use super::runtime;
use crate::settings::AppConfig;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("🏥 Sketchpad Doctor\n");

    let mut all_ok = true;

    all_ok &= check_viewport(config);
    all_ok &= check_storage(config).await;
    all_ok &= check_sandbox(config).await;

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to draw.");
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        std::process::exit(1);
    }

    Ok(())
}

fn check_viewport(config: &AppConfig) -> bool {
    print!("Checking default canvas... ");
    match config.default_viewport() {
        Ok(viewport) => {
            println!("✅ {viewport}");
            true
        }
        Err(e) => {
            println!("❌ {e:#}");
            false
        }
    }
}

async fn check_storage(config: &AppConfig) -> bool {
    print!("Checking session storage... ");
    let gateway = runtime::open_gateway(config).await;

    if !gateway.is_available().await {
        println!("❌ {} store rejected a probe write", gateway.backend_name());
        return false;
    }
    println!("✅ {} (namespace '{}')", gateway.backend_name(), gateway.namespace());
    if gateway.backend_name() == "memory" {
        println!("  ⚠️  Sessions are not kept between runs");
    }

    match ProjectStore::restore(&gateway).await {
        Some(project) => println!("  ✅ Session project '{}' ({})", project.name, project.viewport),
        None => println!("  ℹ️  No session project yet"),
    }
    true
}

async fn check_sandbox(config: &AppConfig) -> bool {
    print!("Checking script sandbox... ");
    let sandbox = runtime::build_sandbox(config);

    if sandbox.health_check().await {
        println!(
            "✅ OK (timeout {}ms{})",
            config.sandbox.timeout_ms,
            if config.sandbox.isolate_globals {
                ", isolated globals"
            } else {
                ""
            }
        );
        true
    } else {
        println!("❌ A trivial drawing failed to render");
        false
    }
}
