pub(crate) mod curve;
pub(crate) mod palette;
pub(crate) mod sampler;
