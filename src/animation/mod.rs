pub(crate) mod anim;
pub(crate) mod compose;
pub(crate) mod ease;
pub(crate) mod run;
pub(crate) mod tween;
