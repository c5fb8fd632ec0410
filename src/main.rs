fn main() {
    ses::app::startup::startup();
}
