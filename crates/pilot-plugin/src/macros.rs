//! Convenience macros for building plugins.

/// Builds a shared [`ActionPlugin`](crate::ActionPlugin).
///
/// # Example
/// ```rust,ignore
/// let plugin = action_plugin!("status", {
///     "plug" => |params, _catalog| {
///         tracing::info!(?params, "status plugged");
///         Ok(())
///     },
///     "unplug" => |_, _| Ok(()),
/// });
/// catalog.register([plugin])?;
/// ```
#[macro_export]
macro_rules! action_plugin {
    ($name:expr) => {
        $crate::plugin::ActionPlugin::builder($name).shared()
    };
    ($name:expr, { $($action:expr => $handler:expr),* $(,)? }) => {
        $crate::plugin::ActionPlugin::builder($name)
            $(.on($action, $handler))*
            .shared()
    };
}
