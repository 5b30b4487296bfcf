use newsroom_gallery::MediaPayload;
use serde_json::json;

pub const BASE_URL: &str = "https://media.example.com";
pub const IMAGE: &str = "https://media.example.com/uploads/a.jpg";
pub const AUDIO: &str = "https://media.example.com/uploads/b.mp3";
pub const VIDEO: &str = "https://media.example.com/uploads/c.mp4";

/// One image, one audio clip, one video.
pub fn mixed_payload() -> MediaPayload {
    MediaPayload::from_json(&mixed_report().to_string()).expect("Fixture report should parse")
}

pub fn mixed_report() -> serde_json::Value {
    json!({
        "headline": "Bridge closed after flooding",
        "files": {
            "images": ["/uploads/a.jpg"],
            "audios": ["/uploads/b.mp3"],
            "videos": ["/uploads/c.mp4"]
        }
    })
}

/// Several audio clips and videos so that navigation keeps switching handles.
pub fn busy_payload() -> MediaPayload {
    MediaPayload {
        images: vec!["/uploads/p1.jpg".to_string(), "/uploads/p2.jpg".to_string()],
        audios: vec![
            "/uploads/s1.mp3".to_string(),
            "/uploads/s2.mp3".to_string(),
            "/uploads/s3.mp3".to_string(),
        ],
        videos: vec!["/uploads/v1.mp4".to_string(), "/uploads/v2.mp4".to_string()],
        ..Default::default()
    }
}

pub fn images_only(count: usize) -> MediaPayload {
    MediaPayload {
        images: (0..count).map(|i| format!("/uploads/{}.jpg", i)).collect(),
        ..Default::default()
    }
}
