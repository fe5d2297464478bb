fn main() {
    locograph::cli::run();
}
