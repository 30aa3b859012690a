/// Final stamp dimensions in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StampSize {
    pub width: f64,
    pub height: f64,
}

impl StampSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Derive the stamp size from the image's intrinsic size and the
    /// requested constraints.
    ///
    /// Rules, first applicable wins:
    /// 1. no width, no height, scale given: intrinsic × scale
    /// 2. width only with `keep_aspect`: height follows the image ratio
    /// 3. height only with `keep_aspect`: width follows the image ratio
    ///
    /// Any dimension still unresolved falls back to the intrinsic one. An
    /// aspect ratio against a zero intrinsic dimension is not derived.
    pub fn compute(
        intrinsic: StampSize,
        width: Option<f64>,
        height: Option<f64>,
        scale: Option<f64>,
        keep_aspect: bool,
    ) -> StampSize {
        let (mut w, mut h) = (width, height);
        match (width, height, scale) {
            (None, None, Some(s)) => {
                w = Some(intrinsic.width * s);
                h = Some(intrinsic.height * s);
            }
            (Some(w0), None, _) if keep_aspect && intrinsic.width != 0.0 => {
                h = Some(w0 * intrinsic.height / intrinsic.width);
            }
            (None, Some(h0), _) if keep_aspect && intrinsic.height != 0.0 => {
                w = Some(h0 * intrinsic.width / intrinsic.height);
            }
            _ => {}
        }
        StampSize {
            width: w.unwrap_or(intrinsic.width),
            height: h.unwrap_or(intrinsic.height),
        }
    }
}
