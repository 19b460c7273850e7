use argh::FromArgs;

/// Person detection and extraction pipeline
#[derive(FromArgs, Debug)]
pub struct Args {
    /// path to the input video
    #[argh(
        option,
        short = 'v',
        default = "String::from(\"input/test_video.mp4\")"
    )]
    pub video: String,

    /// directory where extracted person crops are written
    #[argh(
        option,
        short = 'o',
        default = "String::from(\"output/cropped_persons\")"
    )]
    pub output: String,

    /// model dtype
    #[argh(option, default = "String::from(\"auto\")")]
    pub dtype: String,

    /// YOLO version
    #[argh(option, default = "8.0")]
    pub ver: f32,

    /// device: cuda, cpu, mps
    #[argh(option, default = "String::from(\"cpu:0\")")]
    pub device: String,

    /// model scale: n, s, m, l
    #[argh(option, default = "String::from(\"n\")")]
    pub scale: String,
}
