//! Banner and header printing.

/// Print the application banner.
pub fn print_banner() {
    println!("\n\x1b[1;32m╔══════════════════════════════════════╗\x1b[0m");
    println!("\x1b[1;32m║\x1b[0m            \x1b[1mPixcode\x1b[0m                   \x1b[1;32m║\x1b[0m");
    println!("\x1b[1;32m║\x1b[0m        Pix copia e cola codes        \x1b[1;32m║\x1b[0m");
    println!("\x1b[1;32m╚══════════════════════════════════════╝\x1b[0m\n");
}
