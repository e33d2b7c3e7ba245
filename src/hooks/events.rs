//! Well-known hook event names.
//!
//! The lifecycle events are fired by `Registry::initialize` and
//! `Registry::shutdown`. The render events are never fired by this crate;
//! they exist so renderers and plugins agree on names.

pub const BEFORE_INIT: &str = "before_init";
pub const AFTER_INIT: &str = "after_init";
pub const BEFORE_SHUTDOWN: &str = "before_shutdown";
pub const AFTER_SHUTDOWN: &str = "after_shutdown";

pub const BEFORE_RENDER: &str = "before_render";
pub const AFTER_RENDER: &str = "after_render";
pub const BEFORE_HEAD: &str = "before_head";
pub const AFTER_HEAD: &str = "after_head";
pub const BEFORE_BODY: &str = "before_body";
pub const AFTER_BODY: &str = "after_body";
pub const BEFORE_SCRIPTS: &str = "before_scripts";
pub const AFTER_SCRIPTS: &str = "after_scripts";

/// Events fired during plugin lifecycle transitions.
pub const LIFECYCLE: [&str; 4] = [BEFORE_INIT, AFTER_INIT, BEFORE_SHUTDOWN, AFTER_SHUTDOWN];

/// Events reserved for the rendering pipeline.
pub const RENDER: [&str; 8] = [
    BEFORE_RENDER,
    AFTER_RENDER,
    BEFORE_HEAD,
    AFTER_HEAD,
    BEFORE_BODY,
    AFTER_BODY,
    BEFORE_SCRIPTS,
    AFTER_SCRIPTS,
];
