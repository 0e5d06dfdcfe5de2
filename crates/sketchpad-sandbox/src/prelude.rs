//! Script-side setup
//!
//! JavaScript evaluated in every fresh engine context before the artist's
//! script. It builds the `draw` capability object bound to one surface,
//! records drawing calls as plain JSON records, and reports back through a
//! single `collect()` call.

use sketchpad_canvas::SurfaceBinding;

/// Lines the wrapper places before the first script line
pub(crate) const WRAPPER_HEADER_LINES: u32 = 1;

/// Expression that returns the JSON report for the finished script
pub(crate) const COLLECT_SOURCE: &str = "__sketchpad.collect()";

/// Globals left in place when isolation is enabled
pub(crate) const ALLOWED_GLOBALS: &[&str] = &[
    "__sketchpad",
    "console",
    "globalThis",
    "undefined",
    "NaN",
    "Infinity",
    "Math",
    "JSON",
    "Number",
    "String",
    "Boolean",
    "Symbol",
    "Array",
    "Object",
    "Map",
    "Set",
    "Date",
    "Promise",
    "Error",
    "TypeError",
    "RangeError",
    "SyntaxError",
    "ReferenceError",
    "parseInt",
    "parseFloat",
    "isNaN",
    "isFinite",
];

const CAPABILITY_SOURCE: &str = r#"
var __sketchpad = (function (width, height, pixelWidth, pixelHeight) {
    'use strict';
    var stringify = JSON.stringify;
    var finiteNumber = Number.isFinite;
    var isArray = Array.isArray;
    var elements = [];
    var logs = [];
    var calls = 0;
    var outcome = { settled: false, error: null };

    function finite(value, label) {
        var n = (typeof value === 'number') ? value : (typeof value === 'string' ? Number(value) : NaN);
        if (!finiteNumber(n)) {
            throw new TypeError(label + ' must be a finite number, got ' + String(value));
        }
        return n;
    }

    function styleFrom(attrs) {
        var style = {};
        if (attrs === undefined || attrs === null) {
            return style;
        }
        if (typeof attrs !== 'object') {
            throw new TypeError('style attributes must be an object');
        }
        if (attrs.fill !== undefined) { style.fill = String(attrs.fill); }
        if (attrs.stroke !== undefined) { style.stroke = String(attrs.stroke); }
        var strokeWidth = (attrs.strokeWidth !== undefined) ? attrs.strokeWidth : attrs['stroke-width'];
        if (strokeWidth !== undefined) { style.strokeWidth = finite(strokeWidth, 'strokeWidth'); }
        if (attrs.opacity !== undefined) { style.opacity = finite(attrs.opacity, 'opacity'); }
        return style;
    }

    function pointList(points) {
        if (!isArray(points)) {
            throw new TypeError('points must be an array of [x, y] pairs');
        }
        var out = [];
        for (var i = 0; i < points.length; i++) {
            var p = points[i];
            if (!isArray(p) || p.length !== 2) {
                throw new TypeError('point ' + i + ' must be an [x, y] pair');
            }
            out.push([finite(p[0], 'point x'), finite(p[1], 'point y')]);
        }
        return out;
    }

    function handle(record) {
        var h = {
            fill: function (color) {
                record.style.fill = String(color);
                return h;
            },
            stroke: function (color, strokeWidth) {
                record.style.stroke = String(color);
                if (strokeWidth !== undefined) {
                    record.style.strokeWidth = finite(strokeWidth, 'strokeWidth');
                }
                return h;
            },
            opacity: function (value) {
                record.style.opacity = finite(value, 'opacity');
                return h;
            }
        };
        return h;
    }

    function shape(build) {
        return function () {
            calls += 1;
            var record = build.apply(null, arguments);
            elements.push(record);
            return handle(record);
        };
    }

    var draw = {
        width: width,
        height: height,
        pixelWidth: pixelWidth,
        pixelHeight: pixelHeight,
        rect: shape(function (x, y, w, h, attrs) {
            return { kind: 'rect', x: finite(x, 'x'), y: finite(y, 'y'),
                     width: finite(w, 'width'), height: finite(h, 'height'), style: styleFrom(attrs) };
        }),
        circle: shape(function (cx, cy, r, attrs) {
            return { kind: 'circle', cx: finite(cx, 'cx'), cy: finite(cy, 'cy'),
                     r: finite(r, 'r'), style: styleFrom(attrs) };
        }),
        ellipse: shape(function (cx, cy, rx, ry, attrs) {
            return { kind: 'ellipse', cx: finite(cx, 'cx'), cy: finite(cy, 'cy'),
                     rx: finite(rx, 'rx'), ry: finite(ry, 'ry'), style: styleFrom(attrs) };
        }),
        line: shape(function (x1, y1, x2, y2, attrs) {
            return { kind: 'line', x1: finite(x1, 'x1'), y1: finite(y1, 'y1'),
                     x2: finite(x2, 'x2'), y2: finite(y2, 'y2'), style: styleFrom(attrs) };
        }),
        polyline: shape(function (points, attrs) {
            return { kind: 'polyline', points: pointList(points), style: styleFrom(attrs) };
        }),
        polygon: shape(function (points, attrs) {
            return { kind: 'polygon', points: pointList(points), style: styleFrom(attrs) };
        }),
        path: shape(function (d, attrs) {
            return { kind: 'path', d: String(d), style: styleFrom(attrs) };
        }),
        text: shape(function (x, y, content, attrs) {
            var record = { kind: 'text', x: finite(x, 'x'), y: finite(y, 'y'),
                           content: String(content), style: styleFrom(attrs) };
            if (attrs && attrs.size !== undefined) {
                record.size = finite(attrs.size, 'size');
            }
            return record;
        }),
        clear: function () {
            calls += 1;
            elements.length = 0;
        }
    };
    Object.freeze(draw);

    function describe(e) {
        try {
            if (e !== null && typeof e === 'object') {
                return {
                    name: (e.name !== undefined) ? String(e.name) : null,
                    message: (e.message !== undefined) ? String(e.message) : String(e),
                    stack: (typeof e.stack === 'string') ? e.stack : null
                };
            }
            return { name: null, message: String(e), stack: null };
        } catch (inner) {
            return { name: null, message: 'Script threw a value that cannot be printed', stack: null };
        }
    }

    function show(value) {
        if (value !== null && typeof value === 'object') {
            try { return stringify(value); } catch (e) { return String(value); }
        }
        return String(value);
    }

    return {
        draw: draw,
        log: function (level, args) {
            var parts = [];
            for (var i = 0; i < args.length; i++) {
                parts.push(show(args[i]));
            }
            logs.push(level + ': ' + parts.join(' '));
        },
        resolve: function () {
            outcome.settled = true;
        },
        reject: function (e) {
            outcome.settled = true;
            outcome.error = describe(e);
        },
        collect: function () {
            return stringify({
                settled: outcome.settled,
                error: outcome.error,
                calls: calls,
                elements: elements,
                logs: logs
            });
        }
    };
})(__BINDING__);

var console = (function (sink, capture) {
    function emit(level) {
        return function () {
            if (capture) {
                sink.log(level, arguments);
            }
        };
    }
    return { log: emit('log'), info: emit('info'), warn: emit('warn'), error: emit('error'), debug: emit('debug') };
})(__sketchpad, __CAPTURE__);
"#;

const ISOLATION_SOURCE: &str = r#"
(function (allowed) {
    var global = globalThis;
    var names = Object.getOwnPropertyNames(global);
    for (var i = 0; i < names.length; i++) {
        if (allowed.indexOf(names[i]) === -1) {
            try { delete global[names[i]]; } catch (e) { }
        }
    }
})(__ALLOWED__);
"#;

/// Source that installs the capability object (and optionally strips globals)
pub(crate) fn setup_source(binding: &SurfaceBinding, capture_console: bool, isolate: bool) -> String {
    let args = format!(
        "{}, {}, {}, {}",
        binding.width, binding.height, binding.pixel_width, binding.pixel_height
    );
    let mut source = CAPABILITY_SOURCE
        .replace("__BINDING__", &args)
        .replace("__CAPTURE__", if capture_console { "true" } else { "false" });

    if isolate {
        let allowed = ALLOWED_GLOBALS
            .iter()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", ");
        source.push_str(&ISOLATION_SOURCE.replace("__ALLOWED__", &format!("[{allowed}]")));
    }
    source
}

/// Wrap the artist's script into a callable whose only parameter is `draw`
pub(crate) fn wrap_script(script: &str) -> String {
    format!(
        "(async function (draw) {{\n{script}\n}})(__sketchpad.draw).then(__sketchpad.resolve, __sketchpad.reject);\n"
    )
}
