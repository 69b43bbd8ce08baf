fn main() -> Result<(), Box<dyn std::error::Error>> {
    tutorial_capture_lib::run()
}
