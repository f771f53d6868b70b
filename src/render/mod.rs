pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod display;
pub(crate) mod fingerprint;
pub(crate) mod pipeline;
pub(crate) mod sink;
