/// Runtime settings for the host loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// instructions executed per frame; the speed knob
    pub cycles_per_frame: u32,
    /// frames per second; timers tick and the screen redraws at this rate
    pub frame_rate: u32,
    /// start with the tone muted
    pub muted: bool,
    /// stop after this many frames
    pub max_frames: Option<u64>,
    /// seed for the Cxkk random source
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_frame: 10,
            frame_rate: 60,
            muted: false,
            max_frames: None,
            seed: None,
        }
    }
}
