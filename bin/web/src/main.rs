#[cfg(feature = "csr")]
fn main() {
    use taller_web::app::App;

    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}

#[cfg(not(feature = "csr"))]
fn main() {
    // The app only runs in the browser; build with `--features csr`.
}
