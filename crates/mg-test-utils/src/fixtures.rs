//! Canned vendor API bodies, shaped like real SRS 5 and ZLMediaKit responses.

use serde_json::{json, Value};

/// SRS `GET /api/v1/versions`.
pub fn srs_versions() -> Value {
    json!({
        "code": 0,
        "server": "vid-y19n6nm",
        "service": "382k456r",
        "pid": "9495",
        "data": {
            "major": 5,
            "minor": 0,
            "revision": 210,
            "version": "5.0.210"
        }
    })
}

/// SRS `GET /api/v1/streams/`: `cam1` publishing H264/AAC with two players,
/// `cam2` idle with no tracks.
pub fn srs_streams() -> Value {
    json!({
        "code": 0,
        "server": "vid-y19n6nm",
        "service": "382k456r",
        "pid": "9495",
        "streams": [
            {
                "id": "vid-9y0ozy0",
                "name": "cam1",
                "vhost": "vid-v2ws53u",
                "app": "live",
                "tcUrl": "webrtc://10.0.0.5:1985/live",
                "url": "/live/cam1",
                "live_ms": 1720428680003u64,
                "clients": 3,
                "frames": 8431,
                "send_bytes": 66463941,
                "recv_bytes": 89323998,
                "kbps": {"recv_30s": 0, "send_30s": 0},
                "publish": {"active": true, "cid": "b3op069g"},
                "video": {"codec": "H264", "profile": "High", "level": "3.1", "width": 1280, "height": 720},
                "audio": {"codec": "AAC", "sample_rate": 44100, "channel": 2, "profile": "LC"}
            },
            {
                "id": "vid-2k1c7x0",
                "name": "cam2",
                "vhost": "vid-v2ws53u",
                "app": "live",
                "tcUrl": "rtmp://10.0.0.5/live",
                "url": "/live/cam2",
                "live_ms": 1720428680003u64,
                "clients": 1,
                "frames": 0,
                "send_bytes": 0,
                "recv_bytes": 1024,
                "kbps": {"recv_30s": 0, "send_30s": 0},
                "publish": {"active": false, "cid": "c1a2b3c4"},
                "video": null,
                "audio": null
            }
        ]
    })
}

/// SRS `GET /api/v1/clients/`: one publisher on `cam1`, two players on
/// `cam1` and one on `cam2`.
pub fn srs_clients() -> Value {
    json!({
        "code": 0,
        "server": "vid-y19n6nm",
        "service": "382k456r",
        "pid": "9495",
        "clients": [
            srs_client("pub-1", "cam1", "10.0.0.2", "rtmp-publish", true, 120.5),
            srs_client("play-1", "cam1", "10.0.0.9", "rtc-play", false, 12.345),
            srs_client("play-2", "cam1", "10.0.0.10", "flv-play", false, 1.0),
            srs_client("play-3", "cam2", "10.0.0.11", "rtc-play", false, 0.5)
        ]
    })
}

fn srs_client(id: &str, stream: &str, ip: &str, kind: &str, publish: bool, alive: f64) -> Value {
    json!({
        "id": id,
        "vhost": "vid-v2ws53u",
        "stream": stream,
        "ip": ip,
        "pageUrl": "",
        "swfUrl": "",
        "tcUrl": "webrtc://10.0.0.5:1985/live",
        "url": format!("/live/{stream}"),
        "name": stream,
        "type": kind,
        "publish": publish,
        "alive": alive,
        "send_bytes": 0,
        "recv_bytes": 0,
        "kbps": {"recv_30s": 0, "send_30s": 0}
    })
}

/// ZLM `GET /index/api/version`.
pub fn zlm_version() -> Value {
    json!({
        "code": 0,
        "data": {
            "branchName": "master",
            "buildTime": "2023-04-19T10:34:34",
            "commitHash": "f143898"
        }
    })
}

/// ZLM `GET /index/api/getMediaList?schema=rtsp`: `cam1` with a single H264
/// track, `cam2` with H265 video, AAC audio and no readers.
pub fn zlm_media_list() -> Value {
    json!({
        "code": 0,
        "data": [
            {
                "app": "live",
                "stream": "cam1",
                "schema": "rtsp",
                "vhost": "__defaultVhost__",
                "aliveSecond": 42,
                "readerCount": 2,
                "totalReaderCount": 2,
                "originType": 1,
                "originUrl": "rtsp://10.0.0.6:554/live/cam1",
                "bytesSpeed": 1024,
                "tracks": [
                    {
                        "codec_id": 0,
                        "codec_id_name": "CodecH264",
                        "codec_type": 0,
                        "fps": 25.0,
                        "height": 720,
                        "width": 1280,
                        "ready": true
                    }
                ]
            },
            {
                "app": "live",
                "stream": "cam2",
                "schema": "rtsp",
                "vhost": "__defaultVhost__",
                "aliveSecond": 0,
                "readerCount": 0,
                "totalReaderCount": 0,
                "originType": 1,
                "originUrl": "",
                "tracks": [
                    {
                        "codec_id": 1,
                        "codec_id_name": "CodecH265",
                        "codec_type": 0,
                        "fps": 30.0,
                        "height": 1080,
                        "width": 1920,
                        "ready": true
                    },
                    {
                        "codec_id": 2,
                        "codec_id_name": "CodecAAC",
                        "codec_type": 1,
                        "channels": 1,
                        "sample_bit": 16,
                        "sample_rate": 8000,
                        "ready": true
                    }
                ]
            }
        ]
    })
}

/// ZLM `GET /index/api/getMediaPlayerList`: two players.
pub fn zlm_player_list() -> Value {
    json!({
        "code": 0,
        "data": [
            {
                "identifier": "3-cam1",
                "local_ip": "10.0.0.6",
                "local_port": 554,
                "peer_ip": "10.0.0.9",
                "peer_port": 50000,
                "typeid": "mediakit::RtspSession"
            },
            {
                "identifier": "7-cam2",
                "local_ip": "10.0.0.6",
                "local_port": 8000,
                "peer_ip": "10.0.0.12",
                "peer_port": 50002,
                "typeid": "mediakit::WebRtcSession"
            }
        ]
    })
}

/// Vendor failure envelope returned with HTTP 200.
pub fn vendor_error(code: i64, msg: &str) -> Value {
    json!({ "code": code, "msg": msg })
}

/// Signaling answer body accepted by both dialects.
pub fn signaling_answer(sdp: &str) -> Value {
    json!({ "code": 0, "server": "vid-y19n6nm", "sdp": sdp, "sessionid": "t1x0m9:Zl2d" })
}
