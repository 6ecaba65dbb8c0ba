use crate::error::Result;

/// Handle returned by the frame scheduler, used to cancel a request.
pub type FrameHandle = i32;

/// What a scheduled frame is for. The animator keeps at most one request of
/// each kind outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameTask {
    Tick,
    Resize,
}

/// Raw page measurements, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageMetrics {
    /// Layout width of the canvas itself (0 before first layout).
    pub surface_width: f64,
    /// Layout width of the document element.
    pub document_width: f64,
    /// Body and document scroll, offset and client heights.
    pub heights: [f64; 6],
    pub viewport_height: f64,
}

/// The slice of the host page the animator is allowed to see.
pub trait Environment {
    fn page_metrics(&self) -> PageMetrics;
    fn device_pixel_ratio(&self) -> f64;
    /// Ask for `task` to run on the next display refresh.
    fn request_frame(&mut self, task: FrameTask) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Stop delivering page signals (resize, visibility, motion preference).
    fn detach(&mut self);
}
