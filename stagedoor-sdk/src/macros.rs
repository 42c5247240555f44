/// Cross-platform logging macro with explicit level selection.
///
/// Native builds forward to [`tracing`] macros, browser (`wasm32`) builds forward to the
/// `log` facade, and unit tests print to `stdout` with the level as a prefix.
///
/// # Examples
/// ```
/// use stagedoor::cross_log;
/// # fn main() {
/// cross_log!(info, "restored session for user {}", 42);
/// cross_log!(warn, "slow response from {}", "auth/me");
/// # }
/// ```
#[macro_export]
macro_rules! cross_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(all(not(test), target_arch = "wasm32"))]
        log::$level!($($arg)*);
        #[cfg(all(not(test), not(target_arch = "wasm32")))]
        tracing::$level!($($arg)*);
        #[cfg(test)]
        println!("[{}] {}", stringify!($level), format_args!($($arg)*));
    };
}
