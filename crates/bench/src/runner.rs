//! Benchmark runner - Orchestrates the benchmarking process
//!
//! Setup (output directory, sizes, compilation) fails fast. Once the sweep
//! starts, every trial outcome is a verdict and an interrupt only cuts the
//! sweep short; the partial table is still printed.

use std::future::Future;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tokio::fs;

use sortjudge_common::console::{heavy_rule, print_command, show_launcher};
use sortjudge_common::{Compiler, Executor, HarnessError, HarnessResult, StdioMode, Trial, Verdict};

use crate::cli::Args;
use crate::config::Config;
use crate::fixture::FixtureManager;
use crate::report::{BenchReport, progress_prefix, verdict_line};
use crate::size::SizeSpec;

/// Benchmark runner for one invocation of `bench`
pub struct BenchRunner {
    args: Args,
    output_dir: PathBuf,
    hostfile: PathBuf,
    launcher: PathBuf,
    compiler: Compiler,
    executor: Executor,
    fixtures: FixtureManager,
}

impl BenchRunner {
    /// Create a new benchmark runner
    pub fn new(args: Args, config: Config) -> Self {
        let executor = Executor::new(&config.toolchain.launcher, args.timeout);
        let fixtures = FixtureManager::new(&config.fixture_dir, &config.reference_dir);
        let hostfile = args.hostfile.clone().unwrap_or(config.hostfile);

        Self {
            output_dir: config.output_dir,
            hostfile,
            launcher: config.toolchain.launcher.clone(),
            compiler: Compiler::new(config.toolchain),
            executor,
            fixtures,
            args,
        }
    }

    /// Run the whole benchmark and print the report; Ctrl+C stops early
    pub async fn run(&self) -> HarnessResult<BenchReport> {
        let stdin = std::io::BufReader::new(std::io::stdin());
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_with(stdin, interrupt).await
    }

    /// Like [`run`](Self::run), reading the removal confirmation from `input`
    /// and stopping the sweep as soon as `interrupt` resolves. The trial in
    /// flight is killed and left out of the table.
    async fn run_with<R>(&self, input: R, interrupt: impl Future<Output = ()>) -> HarnessResult<BenchReport>
    where
        R: BufRead + Send + 'static,
    {
        self.prepare_output_dir(input).await?;

        show_launcher(&self.launcher);
        println!(
            "output file, stdout, stderr will be stored at {}/",
            self.output_dir.display()
        );

        let sizes = self
            .args
            .sizes
            .iter()
            .map(|token| SizeSpec::parse(token))
            .collect::<HarnessResult<Vec<_>>>()?;

        let executable = self.compiler.resolve(&self.args.filename).await?;
        tracing::info!(executable = %executable.display(), "Benchmarking");

        let mut report = BenchReport::new(&self.args.nps);
        self.fixtures.prepare().await?;

        println!("{}", heavy_rule());

        tokio::select! {
            result = self.sweep(&sizes, &executable, &mut report) => result?,
            _ = interrupt => {
                println!();
                tracing::warn!("Interrupted, reporting completed trials");
            }
        }

        print!("{}", report.render());
        show_launcher(&self.launcher);
        println!("filename = {}", self.args.filename.display());
        tracing::info!(
            accepted = report.verdicts().filter(Verdict::is_accepted).count(),
            trials = report.verdicts().count(),
            "Benchmark finished"
        );

        Ok(report)
    }

    /// Run every size × process-count combination in order
    async fn sweep(
        &self,
        sizes: &[SizeSpec],
        executable: &Path,
        report: &mut BenchReport,
    ) -> HarnessResult<()> {
        for size in sizes {
            let fixture = self.fixtures.ensure(size).await?;
            report.start_size(&size.label);

            for &np in &self.args.nps {
                let stem = format!("{}_{}", size.label, np);
                let trial = Trial {
                    processes: np,
                    hostfile: Some(self.hostfile.clone()),
                    executable: executable.to_path_buf(),
                    int_count: size.int_count,
                    input: fixture.input.clone(),
                    output: self.output_dir.join(format!("{stem}_output")),
                    reference: fixture.sorted.clone(),
                    stdio: StdioMode::Capture {
                        stdout: self.output_dir.join(format!("{stem}_stdout")),
                        stderr: self.output_dir.join(format!("{stem}_stderr")),
                    },
                };

                print!("{}", progress_prefix(&size.label, np));
                std::io::stdout().flush()?;

                let record = self.executor.run(&trial).await?;
                println!("{}", verdict_line(&record));
                if !record.verdict.is_accepted() {
                    print_command(&self.executor.command_line(&trial));
                }
                report.record(&record);
            }
        }
        Ok(())
    }

    /// Clear the previous run's output, asking first unless `--yes`
    async fn prepare_output_dir<R>(&self, input: R) -> HarnessResult<()>
    where
        R: BufRead + Send + 'static,
    {
        if fs::try_exists(&self.output_dir).await? {
            if !self.args.yes {
                let dir = self.output_dir.clone();
                let mut input = input;
                tokio::task::spawn_blocking(move || confirm_removal(&dir, &mut input))
                    .await
                    .map_err(|e| HarnessError::Io(std::io::Error::other(e)))??;
            }
            fs::remove_dir_all(&self.output_dir).await?;
        }
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }
}

/// Wait for the user to press Enter; end of input aborts
fn confirm_removal(dir: &Path, input: &mut impl BufRead) -> HarnessResult<()> {
    print!(
        "{}/ exists, [Enter] to remove or [Ctrl+C] to abort",
        dir.display()
    );
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Err(HarnessError::Aborted);
    }
    Ok(())
}
