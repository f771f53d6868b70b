use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Mat3, Quat, Vec3, lerp_f64};

/// Camera frame placement: the world point at the frame center, the frame size relative to
/// the configured frame, and its orientation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraState {
    pub center: Vec3,
    pub scale: f64,
    pub orientation: Quat,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            scale: 1.0,
            orientation: Quat::IDENTITY,
        }
    }
}

impl CameraState {
    /// Frame coordinates to world: `T(center) · R · S(scale)`.
    pub fn frame_to_world(&self) -> Affine3 {
        let linear = self.orientation.to_mat3() * Mat3::scale(self.scale);
        Affine3 {
            linear,
            translation: self.center,
        }
    }

    /// World to frame coordinates, applied last during display-list emission.
    pub fn view(&self) -> Affine3 {
        let scale = if self.scale.abs() < 1e-12 {
            let e = ChoreoError::degenerate_transform("camera scale is zero");
            tracing::warn!(error = %e, "using unit camera scale");
            1.0
        } else {
            self.scale
        };
        let linear = Mat3::scale(1.0 / scale) * self.orientation.conjugate().to_mat3();
        Affine3 {
            linear,
            translation: -linear.mul_vec(self.center),
        }
    }

    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t <= 0.0 {
            return *a;
        }
        if t >= 1.0 {
            return *b;
        }
        Self {
            center: Vec3::lerp(a.center, b.center, t),
            scale: lerp_f64(a.scale, b.scale, t),
            orientation: Quat::slerp(a.orientation, b.orientation, t),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CameraOp {
    Scale(f64),
    Shift(Vec3),
    MoveTo(Vec3),
    Rotate { angle: f64, axis: Vec3 },
    SetWidth(f64),
    SetHeight(f64),
    /// Pops the save stack.
    Restore,
}

#[derive(Clone, Debug)]
pub struct Camera {
    state: CameraState,
    saved: Vec<CameraState>,
    frame_width: f64,
    frame_height: f64,
}

impl Camera {
    pub fn new(frame_width: f64, frame_height: f64) -> Self {
        Self {
            state: CameraState::default(),
            saved: Vec::new(),
            frame_width,
            frame_height,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn set_state(&mut self, state: CameraState) {
        self.state = state;
    }

    pub fn view(&self) -> Affine3 {
        self.state.view()
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn width(&self) -> f64 {
        self.frame_width * self.state.scale
    }

    pub fn height(&self) -> f64 {
        self.frame_height * self.state.scale
    }

    pub fn scale(&mut self, factor: f64) -> &mut Self {
        self.state.scale *= factor;
        self
    }

    pub fn shift(&mut self, by: Vec3) -> &mut Self {
        self.state.center += by;
        self
    }

    pub fn move_to(&mut self, point: Vec3) -> &mut Self {
        self.state.center = point;
        self
    }

    pub fn rotate(&mut self, angle: f64, axis: Vec3) -> &mut Self {
        self.state.orientation =
            (Quat::from_axis_angle(axis, angle) * self.state.orientation).normalize();
        self
    }

    pub fn set_width(&mut self, width: f64) -> &mut Self {
        self.state.scale = width / self.frame_width;
        self
    }

    pub fn set_height(&mut self, height: f64) -> &mut Self {
        self.state.scale = height / self.frame_height;
        self
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.saved.push(self.state);
        self
    }

    pub fn restore(&mut self) -> ChoreoResult<&mut Self> {
        self.state = self.saved.pop().ok_or_else(|| {
            ChoreoError::unbalanced_camera("restore() called with no saved camera state")
        })?;
        Ok(self)
    }

    pub fn apply(&mut self, op: &CameraOp) -> ChoreoResult<()> {
        match op {
            CameraOp::Scale(f) => self.scale(*f),
            CameraOp::Shift(v) => self.shift(*v),
            CameraOp::MoveTo(p) => self.move_to(*p),
            CameraOp::Rotate { angle, axis } => self.rotate(*angle, *axis),
            CameraOp::SetWidth(w) => self.set_width(*w),
            CameraOp::SetHeight(h) => self.set_height(*h),
            CameraOp::Restore => self.restore()?,
        };
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
