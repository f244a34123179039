//! Shared numerical helpers.

mod matrix;

pub use matrix::{
    augment_with_intercept, center_columns, center_vector, detect_constant_columns,
    invert_via_qr, select_columns, solve_pivoted_qr, weighted_cross_product,
};
