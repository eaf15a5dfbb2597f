//! Static lookup tables shared by the extractors, resolver, and scanner.
//!
//! The allow-lists define the identifier key space the extractors produce, so
//! they must stay in sync with the resolver's compat-key mapping and the
//! bundled dataset. Update them here rather than in traversal code.

/// Version of the tables below. Bump when any list changes.
pub const TABLES_VERSION: u32 = 1;

/// Global objects and functions recorded when used as a member-access root.
pub const GLOBAL_APIS: &[&str] = &[
    "fetch",
    "localStorage",
    "sessionStorage",
    "indexedDB",
    "crypto",
    "performance",
    "requestAnimationFrame",
    "IntersectionObserver",
    "ResizeObserver",
    "MutationObserver",
];

/// Bare global functions recorded when called.
pub const WEB_API_CALLS: &[&str] = &[
    "fetch",
    "requestAnimationFrame",
    "cancelAnimationFrame",
    "requestIdleCallback",
    "cancelIdleCallback",
    "addEventListener",
    "removeEventListener",
];

/// Constructors recorded (lower-cased) in `new` expressions.
pub const WEB_API_CONSTRUCTORS: &[&str] = &[
    "IntersectionObserver",
    "ResizeObserver",
    "MutationObserver",
    "PerformanceObserver",
    "ReportingObserver",
    "BroadcastChannel",
    "MessageChannel",
    "Worker",
    "ServiceWorker",
    "SharedWorker",
    "WebSocket",
    "EventSource",
    "AbortController",
];

pub const MODERN_ELEMENTS: &[&str] = &[
    "dialog", "details", "summary", "progress", "meter", "time", "mark", "wbr", "ruby", "rt",
    "rp", "canvas", "svg", "video", "audio", "source", "track", "picture", "template", "slot",
];

pub const MODERN_ATTRIBUTES: &[&str] = &[
    "contenteditable",
    "draggable",
    "dropzone",
    "hidden",
    "spellcheck",
    "translate",
    "role",
    "loading",
    "decoding",
    "fetchpriority",
];

/// Attribute families matched by prefix.
pub const ATTRIBUTE_PREFIXES: &[&str] = &["aria-", "data-"];

/// Feature identifier to browser-compat-data key.
pub const COMPAT_KEYS: &[(&str, &str)] = &[
    // CSS
    ("css-property-grid", "css.properties.grid"),
    ("css-property-flexbox", "css.properties.display.flex"),
    ("css-property-gap", "css.properties.gap"),
    ("css-function-clamp", "css.types.clamp"),
    ("css-function-min", "css.types.min"),
    ("css-function-max", "css.types.max"),
    // JavaScript
    ("fetch", "api.fetch"),
    ("promise", "javascript.builtins.Promise"),
    ("async-await", "javascript.statements.async_function"),
    ("intersection-observer", "api.IntersectionObserver"),
    ("resize-observer", "api.ResizeObserver"),
    // Navigator
    ("navigator-clipboard", "api.Navigator.clipboard"),
    ("navigator-geolocation", "api.Navigator.geolocation"),
    ("navigator-serviceworker", "api.Navigator.serviceWorker"),
    // HTML
    ("html-element-dialog", "html.elements.dialog"),
    ("html-element-details", "html.elements.details"),
    ("html-element-summary", "html.elements.summary"),
];

/// Browsers that must all support a feature for it to be Baseline.
pub const CORE_BROWSERS: &[&str] = &[
    "chrome",
    "chrome_android",
    "edge",
    "firefox",
    "firefox_android",
    "safari",
    "safari_ios",
];

/// Features with a well-known polyfill.
pub const POLYFILLS: &[&str] = &[
    "fetch",
    "abortcontroller",
    "intersectionobserver",
    "resizeobserver",
    "requestIdleCallback",
    "cancelIdleCallback",
    "broadcastchannel",
    "eventsource",
    "navigator-clipboard",
    "html-element-dialog",
    "html-element-details",
    "css-pseudo-focus-visible",
];

/// Features with a commonly used fallback API.
pub const ALTERNATIVES: &[(&str, &str)] = &[
    ("requestIdleCallback", "setTimeout"),
    ("navigator-clipboard", "document.execCommand('copy')"),
    ("navigator-share", "a copy-link fallback"),
    ("intersectionobserver", "scroll events with getBoundingClientRect()"),
    ("resizeobserver", "window resize events"),
    ("broadcastchannel", "storage events on localStorage"),
    ("sharedworker", "worker"),
    ("css-property-gap", "margins on child elements"),
    ("css-property-aspect-ratio", "padding-top percentage boxes"),
    ("css-pseudo-has", "a class toggled from JavaScript"),
    ("css-function-clamp", "min() and max()"),
    ("css-at-rule-container", "@media"),
    ("html-element-dialog", "a <div> with role=\"dialog\""),
    ("html-attribute-loading", "IntersectionObserver-based lazy loading"),
];

pub fn is_global_api(name: &str) -> bool {
    GLOBAL_APIS.contains(&name)
}

pub fn is_web_api_call(name: &str) -> bool {
    WEB_API_CALLS.contains(&name)
}

pub fn is_web_api_constructor(name: &str) -> bool {
    WEB_API_CONSTRUCTORS.contains(&name)
}

/// Expects a lower-cased tag name.
pub fn is_modern_element(tag: &str) -> bool {
    MODERN_ELEMENTS.contains(&tag)
}

/// Expects a lower-cased attribute name.
pub fn is_modern_attribute(attr: &str) -> bool {
    MODERN_ATTRIBUTES.contains(&attr) || ATTRIBUTE_PREFIXES.iter().any(|p| attr.starts_with(p))
}

pub fn compat_key(identifier: &str) -> Option<&'static str> {
    COMPAT_KEYS
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, key)| *key)
}

pub fn has_polyfill(identifier: &str) -> bool {
    POLYFILLS.contains(&identifier)
}

pub fn alternative_for(identifier: &str) -> Option<&'static str> {
    ALTERNATIVES
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, alt)| *alt)
}
