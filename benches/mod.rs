use criterion::{criterion_group, criterion_main};

mod network {
    pub mod application {
        pub mod http {
            pub mod client;
        }
    }
}

criterion_group!(
    benches,
    network::application::http::client::bench_post,
    network::application::http::client::bench_post_with_headers,
    network::application::http::client::bench_large_body,
    network::application::http::client::bench_hello_message
);
criterion_main!(benches);
