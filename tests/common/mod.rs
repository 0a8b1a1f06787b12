use log::LevelFilter;

#[ctor::ctor]
fn init() {
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init()
}
