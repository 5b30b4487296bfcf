// Media store and playback defaults shared by config, normalizer and backends

// === Media Store ===
/// Object store the report clients prefix every uploaded file path with.
pub const DEFAULT_MEDIA_BASE_URL: &str = "https://pbs-nims.s3.ap-southeast-1.amazonaws.com";

// === MIME hints ===
// The clients tag every element with a fixed type rather than sniffing it.
pub const IMAGE_MIME: &str = "image/jpeg";
pub const AUDIO_MIME: &str = "audio/mpeg";
pub const VIDEO_MIME: &str = "video/mp4";

// === Playback ===
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// === Report card grid ===
/// Tiles rendered before the rest collapse into a "+N" badge.
pub const MAX_CARD_TILES: usize = 4;
