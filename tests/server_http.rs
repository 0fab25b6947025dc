#![cfg(feature = "server")]

use lifegrid::server::{ServeConfig, ServerHandle, WallpaperServer};
use lifegrid::ShareLink;

fn start_server() -> (ServerHandle, String) {
    let config = ServeConfig {
        addr: "127.0.0.1:0".to_string(),
        workers: 2,
        font: None,
    };
    let handle = WallpaperServer::bind(&config).expect("bind").spawn();
    let addr = handle.local_addr().expect("ip listener");
    (handle, format!("http://{}", addr))
}

#[test]
fn serves_png_with_no_cache_headers() {
    let (server, base) = start_server();
    let url = format!("{}/api/wallpaper?width=360&height=640&style=weeks&showPercent=1", base);
    let resp = reqwest::blocking::get(&url).expect("request");
    assert_eq!(resp.status().as_u16(), 200);
    let headers = resp.headers().clone();
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
    assert_eq!(headers["pragma"], "no-cache");
    assert_eq!(headers["expires"], "0");
    let body = resp.bytes().expect("body");
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
    server.shutdown();
}

#[test]
fn share_link_is_served() {
    let (server, base) = start_server();
    let link = ShareLink {
        width: 400,
        height: 800,
        ..ShareLink::default()
    };
    let url = link.to_url(&base).unwrap();
    let resp = reqwest::blocking::get(&url).expect("request");
    assert_eq!(resp.status().as_u16(), 200);
    server.shutdown();
}

#[test]
fn errors_are_json() {
    let (server, base) = start_server();

    let resp = reqwest::blocking::get(format!("{}/nope", base)).expect("request");
    assert_eq!(resp.status().as_u16(), 404);
    let body: serde_json::Value = serde_json::from_str(&resp.text().unwrap()).unwrap();
    assert_eq!(body["error"], "not found");

    let client = reqwest::blocking::Client::new();
    let resp = client
        .post(format!("{}/api/wallpaper", base))
        .send()
        .expect("request");
    assert_eq!(resp.status().as_u16(), 405);

    server.shutdown();
}
