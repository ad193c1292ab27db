fn main() {
    track_pipeline::cli::run();
}
