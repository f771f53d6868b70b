pub(crate) mod camera;
pub(crate) mod family;
pub(crate) mod graph;
pub(crate) mod interpreter;
pub(crate) mod morph;
pub(crate) mod ops;
pub(crate) mod tracker;
pub(crate) mod updater;
