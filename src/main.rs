mod capture;
mod config;
mod core;
mod detect;
mod domain;
mod narrate;
mod remote;
mod render;
mod session;
mod widget;

fn main() -> cosmic::iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    core::app::run()
}
