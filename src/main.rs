mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use onnxfixtures::exporter::onnx_exporter::OnnxExporter;
use onnxfixtures::fixtures;
use onnxfixtures::loader::onnx_loader::OnnxLoader;
use onnxfixtures::loader::ModelLoader;
use onnxfixtures::registry::runner::{Outcome, Runner};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).context("invalid --log filter")?)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::List => {
            let registry = fixtures::registry()?;
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Gen { names } => {
            let registry = fixtures::registry()?;
            create_out_dir(&cli.out_dir)?;
            let runner = Runner::new(OnnxExporter::default(), &cli.out_dir);
            for name in &names {
                let path = runner
                    .run_one(&registry, name)
                    .with_context(|| format!("generating {name}"))?;
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::All { filter, jobs } => {
            let registry = fixtures::registry()?;
            create_out_dir(&cli.out_dir)?;
            let runner = Runner::new(OnnxExporter::default(), &cli.out_dir).with_jobs(jobs);

            let keep = |name: &str| filter.as_deref().map_or(true, |f| name.contains(f));
            let results = runner.run_all(&registry, Some(&keep));

            let mut failed = 0;
            for (name, outcome) in &results {
                match outcome {
                    Outcome::Written(path) => println!("ok      {name} -> {}", path.display()),
                    Outcome::Failed(e) => {
                        failed += 1;
                        println!("FAILED  {name}: {e}");
                    }
                    Outcome::Cancelled => println!("skipped {name}"),
                }
            }
            println!("{} fixtures, {} failed", results.len(), failed);

            if failed > 0 {
                anyhow::bail!("{failed} fixture(s) failed");
            }
            Ok(())
        }
        Command::Inspect { file } => {
            let model = OnnxLoader::load(&file).with_context(|| format!("loading {file}"))?;
            let graph = &model.graph;
            println!("graph {} (producer {})", graph.name, model.producer);
            for input in &graph.inputs {
                println!("  input  {} {:?} {:?}", input.name, input.data_type, input.shape);
            }
            for output in &graph.outputs {
                println!("  output {} {:?} {:?}", output.name, output.data_type, output.shape);
            }
            for init in &graph.initializers {
                println!("  init   {} {:?} {:?}", init.name, init.data_type, init.dims);
            }
            for node in &graph.nodes {
                println!("  {} {:?} -> {:?}", node.op_type, node.inputs, node.outputs);
            }
            Ok(())
        }
    }
}

fn create_out_dir(out_dir: &str) -> Result<()> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {out_dir}"))
}
