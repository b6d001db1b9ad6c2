//! Structured script emission.
//!
//! Generators do not splice profile data into JavaScript text. Instead they
//! build override directives against a small IR: property getters carry a
//! JSON-serializable value, behavior patches are *static* function-expression
//! templates invoked with a serde-serialized config object. Every embedded
//! value passes through `serde_json::to_string`, so a hostile catalog field
//! can never break out of its string literal into the page context.
//!
//! Each rendered fragment is a self-contained IIFE that fails closed: any
//! internal error is swallowed with a non-fatal `console.debug` trace and
//! the browser's native behavior is left untouched.
//!
//! # Example
//!
//! ```rust
//! use fp_forge::script::{FragmentBuilder, Target};
//!
//! let fragment = FragmentBuilder::new("screen")
//!     .define_getter(Target::Screen, "width", &1920)
//!     .build();
//!
//! let js = fragment.render();
//! assert!(js.contains("defineProperty"));
//! ```

use serde::Serialize;

/// Objects a getter override can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Navigator,
    Screen,
    Window,
}

impl Target {
    fn expr(self) -> &'static str {
        match self {
            Target::Navigator => "navigator",
            Target::Screen => "screen",
            Target::Window => "window",
        }
    }
}

/// Serialize a value as a JS expression. Plain data never fails to
/// serialize; a pathological value degrades to `null` rather than
/// producing a broken script.
pub fn js_value<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Deterministic in-page PRNG (mulberry32), installed once per page under a
/// guard. Surface fragments seed it with their digest-derived lane so noise
/// is a pure function of (seed, element identity), never `Math.random`.
pub const SEEDED_PRNG_HELPER: &str = r#"(function() {
    'use strict';
    if (window.__fpRand) { return; }
    window.__fpRand = function(seed) {
        var t = seed >>> 0;
        return function() {
            t = (t + 0x6D2B79F5) >>> 0;
            var r = t;
            r = Math.imul(r ^ (r >>> 15), r | 1);
            r ^= r + Math.imul(r ^ (r >>> 7), r | 61);
            return ((r ^ (r >>> 14)) >>> 0) / 4294967296;
        };
    };
    window.__fpHash = function(s) {
        var h = 2166136261 >>> 0;
        for (var i = 0; i < s.length; i++) {
            h = Math.imul(h ^ s.charCodeAt(i), 16777619) >>> 0;
        }
        return h;
    };
})();
"#;

/// One rendered, self-contained override script for a single surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFragment {
    surface: &'static str,
    body: String,
}

impl ScriptFragment {
    /// The surface this fragment overrides.
    pub fn surface(&self) -> &'static str {
        self.surface
    }

    /// The complete fragment text.
    pub fn render(&self) -> &str {
        &self.body
    }
}

/// Builder for a surface fragment.
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    surface: &'static str,
    needs_prng: bool,
    statements: Vec<String>,
}

impl FragmentBuilder {
    pub fn new(surface: &'static str) -> Self {
        Self {
            surface,
            needs_prng: false,
            statements: Vec::new(),
        }
    }

    /// Ensure the shared seeded-PRNG helper is available to this fragment
    /// even when it runs standalone. The helper is guarded, so emitting it
    /// from several fragments is harmless.
    pub fn require_prng(mut self) -> Self {
        self.needs_prng = true;
        self
    }

    /// Override `target.property` with a constant getter.
    pub fn define_getter<T: Serialize + ?Sized>(
        mut self,
        target: Target,
        property: &str,
        value: &T,
    ) -> Self {
        self.statements.push(format!(
            "defineGetter({}, {}, {});",
            target.expr(),
            js_value(property),
            js_value(value)
        ));
        self
    }

    /// Apply a static behavior template to a serialized config object.
    ///
    /// `template` must be a JS function expression of one argument. It is a
    /// compile-time constant; the only dynamic content is the config, which
    /// is embedded via JSON serialization.
    pub fn apply<C: Serialize>(mut self, template: &'static str, config: &C) -> Self {
        self.statements
            .push(format!("({})({});", template.trim(), js_value(config)));
        self
    }

    /// Render the fragment: IIFE wrapper, getter helper, fail-closed catch.
    pub fn build(self) -> ScriptFragment {
        let mut body = String::new();
        if self.needs_prng {
            body.push_str(SEEDED_PRNG_HELPER);
        }
        body.push_str("(function() {\n'use strict';\ntry {\n");
        body.push_str(
            "var defineGetter = function(target, property, value) {\n\
             \x20   try {\n\
             \x20       Object.defineProperty(target, property, {\n\
             \x20           get: function() { return value; },\n\
             \x20           configurable: true\n\
             \x20       });\n\
             \x20   } catch (e) {}\n\
             };\n",
        );
        for statement in &self.statements {
            body.push_str(statement);
            body.push('\n');
        }
        body.push_str(&format!(
            "}} catch (e) {{\n\
             \x20   try {{ console.debug('fp-forge: {} overrides skipped:', e); }} catch (ignored) {{}}\n\
             }}\n}})();\n",
            self.surface
        ));
        ScriptFragment {
            surface: self.surface,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_getter_values_are_json_escaped() {
        let fragment = FragmentBuilder::new("test")
            .define_getter(Target::Navigator, "userAgent", "evil\"; alert(1); //")
            .build();

        let js = fragment.render();
        // The payload must stay inside its string literal.
        assert!(js.contains(r#""evil\"; alert(1); //""#));
        assert!(!js.contains("\"; alert(1); //\";"));
    }

    #[test]
    fn test_fragment_is_fail_closed() {
        let fragment = FragmentBuilder::new("canvas")
            .define_getter(Target::Screen, "width", &1920)
            .build();
        let js = fragment.render();
        assert!(js.starts_with("(function() {"));
        assert!(js.contains("} catch (e) {"));
        assert!(js.contains("console.debug"));
    }

    #[test]
    fn test_apply_embeds_config_as_json() {
        #[derive(Serialize)]
        struct Cfg {
            lane: u32,
            label: String,
        }
        let fragment = FragmentBuilder::new("test")
            .apply(
                "function(cfg) { return cfg.lane; }",
                &Cfg {
                    lane: 7,
                    label: "</script>".to_string(),
                },
            )
            .build();
        let js = fragment.render();
        assert!(js.contains(r#"{"lane":7,"#));
        // serde_json escapes the slash-free form; the raw close tag is fine
        // inside an injected script context but the quotes must be escaped.
        assert!(js.contains(r#""label":"#));
    }

    #[test]
    fn test_every_target_renders_to_its_global() {
        let fragment = FragmentBuilder::new("test")
            .define_getter(Target::Navigator, "platform", "Win32")
            .define_getter(Target::Screen, "width", &1920)
            .define_getter(Target::Window, "devicePixelRatio", &1.0)
            .build();
        let js = fragment.render();
        assert!(js.contains("defineGetter(navigator,"));
        assert!(js.contains("defineGetter(screen,"));
        assert!(js.contains("defineGetter(window,"));
    }

    #[test]
    fn test_require_prng_emits_helper_once_per_fragment() {
        let fragment = FragmentBuilder::new("canvas").require_prng().build();
        assert!(fragment.render().contains("__fpRand"));
        assert!(fragment.render().contains("if (window.__fpRand) { return; }"));
    }

    #[test]
    fn test_deterministic_rendering() {
        let build = || {
            FragmentBuilder::new("screen")
                .define_getter(Target::Screen, "width", &1920)
                .define_getter(Target::Screen, "height", &1080)
                .build()
        };
        assert_eq!(build().render(), build().render());
    }
}
