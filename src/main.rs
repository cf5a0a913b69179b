//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de archivos.

use file_server::config::Config;
use file_server::server::Server;

fn main() {
    println!("=================================");
    println!("  File Server");
    println!("  Cache + Workers + Async Logging");
    println!("=================================\n");

    // Configuración desde CLI o variables de entorno
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
    };

    if let Ok(addr) = server.local_addr() {
        println!("[+] Servidor escuchando en {}", addr);
    }

    // Esto bloquea el thread
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
