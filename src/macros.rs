//! Convenience macros for building calibration data.

/// Creates a [`CalibrationTable`](crate::control::CalibrationTable) from
/// `(percent, watts)` pairs, checked at compile time.
///
/// # Syntax
///
/// ```text
/// calibration_table![(percent, watts), (percent, watts), ...]
/// ```
///
/// # Examples
///
/// ```rust
/// use tic_router::calibration_table;
/// use tic_router::control::CalibrationTable;
///
/// const TABLE: CalibrationTable = calibration_table![(0, 0), (50, 900), (100, 1800)];
/// assert_eq!(TABLE.watts(1), 900);
/// ```
///
/// # Compile-Time Validation
///
/// ```compile_fail
/// use tic_router::calibration_table;
/// use tic_router::control::CalibrationTable;
///
/// // Watts must not decrease
/// const TABLE: CalibrationTable = calibration_table![(0, 0), (50, 900), (100, 800)];
/// ```
///
/// ```compile_fail
/// use tic_router::calibration_table;
/// use tic_router::control::CalibrationTable;
///
/// // Percent above 100
/// const TABLE: CalibrationTable = calibration_table![(0, 0), (150, 900)];
/// ```
#[macro_export]
macro_rules! calibration_table {
    ($(($percent:literal, $watts:literal)),+ $(,)?) => {{
        const POINTS: &[$crate::control::CalibrationPoint] =
            &[$($crate::control::CalibrationPoint::new($percent, $watts)),+];
        const _: () = {
            if !$crate::control::calibration::is_valid(POINTS) {
                panic!("calibration watts must be non-decreasing and percent at most 100");
            }
        };
        $crate::control::CalibrationTable::from_checked(POINTS)
    }};
}
