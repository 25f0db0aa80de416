/* 📖 # What does the docket binary do?

It plays the host for a handful of exploded deployable units so the engine can be
tried out without an application server:

1. Every argument is a unit directory (`docket build/orders.war build/billing.war`).
2. All units are bound to `default-server`/`default-host`.
3. An HTTP server on `DOCKET_PORT` (default 8080) routes requests to whatever the
   units registered.
4. Units deploy concurrently, one thread each, and the outcome of each is printed.

There is no argument parsing beyond the directory list.

Exit codes:
- 0: at least one unit deployed (the process then serves until it is stopped)
- 1: bad usage, the server could not start, or every unit failed to deploy
*/

mod loader;

use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;

use docket_base::pal::http::HttpServerConfig;
use docket_base::tracing::init_tracing;
use docket_base::{DocketResult, Pal, PalHandle, RealPal, err};
use docket_engine::{
    DeploymentGate, DeploymentOutcome, DeploymentReport, DocumentAssembler, EndpointRegistry,
    FixedHostBinding, FragmentScanner, HostBinding, HostRouter,
};

use crate::loader::load_unit;

const DEFAULT_PORT: u16 = 8080;

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let dirs: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if dirs.is_empty() {
        eprintln!("Usage: docket <unit-dir>...");
        process::exit(1);
    }

    let port = match listen_port() {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let binding = HostBinding::default();
    let registry = EndpointRegistry::new();
    let gate = DeploymentGate::new(
        registry.clone(),
        FixedHostBinding(binding.clone()),
        DocumentAssembler::new(FragmentScanner),
    );

    let pal = PalHandle::new(RealPal::new(PathBuf::from(".")));
    let server = match pal.start_http_server(
        Box::new(HostRouter::new(registry, binding)),
        HttpServerConfig::new("0.0.0.0").with_port(port),
    ) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: Failed to start HTTP server: {}", e);
            process::exit(1);
        }
    };
    println!("Listening on port {}", server.port());

    let results: Vec<(&Path, DocketResult<DeploymentReport>)> = thread::scope(|scope| {
        let handles: Vec<_> = dirs
            .iter()
            .map(|dir| {
                let gate = &gate;
                (dir.as_path(), scope.spawn(move || deploy_dir(gate, dir)))
            })
            .collect();
        handles
            .into_iter()
            .map(|(dir, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(err!("Deployment thread panicked")));
                (dir, result)
            })
            .collect()
    });

    let mut deployed = 0;
    for (dir, result) in &results {
        match result {
            Ok(report) => {
                deployed += 1;
                print_report(report, server.port());
            }
            Err(e) => eprintln!("  - {}: {}", dir.display(), e),
        }
    }
    println!("\nDeployed {}/{} units", deployed, results.len());

    if deployed == 0 {
        eprintln!("No unit could be deployed.");
        process::exit(1);
    }
    if gate.registry().is_empty() {
        println!("No OpenAPI endpoints registered.");
        process::exit(0);
    }

    loop {
        thread::park();
    }
}

fn listen_port() -> DocketResult<u16> {
    match env::var("DOCKET_PORT") {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| err!("Invalid DOCKET_PORT {:?}: {}", value, e)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

fn deploy_dir(gate: &DeploymentGate, dir: &Path) -> DocketResult<DeploymentReport> {
    let unit = load_unit(dir)?;
    gate.on_deploy(&unit)
}

fn print_report(report: &DeploymentReport, port: u16) {
    match &report.outcome {
        DeploymentOutcome::Registered { key } => {
            println!("  + {}: http://localhost:{}{}", report.unit, port, key.path)
        }
        DeploymentOutcome::RegistrationLost { key, owner } => {
            println!("  = {}: {} already served by {}", report.unit, key.path, owner)
        }
        DeploymentOutcome::Disabled => println!("  = {}: disabled", report.unit),
        DeploymentOutcome::Skipped => {
            println!("  = {}: no OpenAPI metadata", report.unit)
        }
    }
}
