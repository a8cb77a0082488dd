/// Checks that a numerical value is in the provided interval `[a,b]` and returns
/// early with [`Error::OutOfInterval`](crate::Error::OutOfInterval) if not
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns an error with the message "invalid value 2 for `alpha`, must be in the interval [0, 1]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        // NaN fails both comparisons
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::OutOfInterval {
                name: stringify!($var),
                value: $var as f64,
                min: $a as f64,
                max: $b as f64,
            });
        }
    };
}
