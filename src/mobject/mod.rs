pub(crate) mod axes;
pub(crate) mod builder;
pub(crate) mod geometry;
pub(crate) mod matrix;
pub(crate) mod shapes;
pub(crate) mod style;
pub(crate) mod text;
