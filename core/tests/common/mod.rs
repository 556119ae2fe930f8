use std::time::Duration;

use catalog_core::{CatalogApi, ClientConfig};

/// Start an empty mock server on a random port and return its base URL.
pub fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn api(base_url: &str) -> CatalogApi {
    CatalogApi::from_config(&ClientConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
}
