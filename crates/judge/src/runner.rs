//! Judge runner - runs the fixed test cases in order

use std::future::Future;
use std::path::{Path, PathBuf};

use sortjudge_common::console::{light_rule, print_command, show_launcher};
use sortjudge_common::executor::recreate_dir;
use sortjudge_common::{Compiler, Executor, HarnessResult, StdioMode, Trial};

use crate::cli::Args;
use crate::config::Config;
use crate::report::{JudgeReport, result_line};
use crate::testcase::{TestCase, TestCaseManager};

/// Judge runner for one invocation of `judge`
pub struct JudgeRunner {
    args: Args,
    output_dir: PathBuf,
    launcher: PathBuf,
    compiler: Compiler,
    executor: Executor,
    testcases: TestCaseManager,
}

impl JudgeRunner {
    /// Create a new judge runner
    pub fn new(args: Args, config: Config) -> Self {
        Self {
            executor: Executor::new(&config.toolchain.launcher, args.timeout),
            testcases: TestCaseManager::new(config.testcase_dir, config.testcase_count),
            output_dir: config.output_dir,
            launcher: config.toolchain.launcher.clone(),
            compiler: Compiler::new(config.toolchain),
            args,
        }
    }

    /// Judge every test case and print the summary; Ctrl+C stops early
    pub async fn run(&self) -> HarnessResult<JudgeReport> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Like [`run`](Self::run), but stops as soon as `interrupt` resolves.
    /// The trial in flight is killed and left out of the summary.
    async fn run_until(&self, interrupt: impl Future<Output = ()>) -> HarnessResult<JudgeReport> {
        show_launcher(&self.launcher);

        let executable = self.compiler.resolve(&self.args.filename).await?;
        let testcases = self.testcases.load().await?;
        recreate_dir(&self.output_dir).await?;

        let mut report = JudgeReport::new();

        tokio::select! {
            result = self.judge_all(&testcases, &executable, &mut report) => result?,
            _ = interrupt => {
                println!();
                tracing::warn!("Interrupted, reporting judged test cases");
            }
        }

        print!("{}", report.render());
        if report.is_empty() {
            tracing::warn!("No test case was judged");
        }
        tracing::info!(
            accepted = report.accepted(),
            judged = report.len(),
            total = testcases.len(),
            "Judging finished"
        );

        Ok(report)
    }

    async fn judge_all(
        &self,
        testcases: &[TestCase],
        executable: &Path,
        report: &mut JudgeReport,
    ) -> HarnessResult<()> {
        for testcase in testcases {
            let number = testcase.spec.number;
            let trial = Trial {
                processes: testcase.processes,
                hostfile: None,
                executable: executable.to_path_buf(),
                int_count: testcase.spec.size,
                input: testcase.input_path.clone(),
                output: self.output_dir.join(format!("output{number}")),
                reference: testcase.expected_path.clone(),
                stdio: StdioMode::Inherit,
            };

            println!("{}", light_rule());
            print_command(&self.executor.command_line(&trial));

            let record = self.executor.run(&trial).await?;
            println!("{}", result_line(number, &record));
            report.record(number, record);
        }
        Ok(())
    }
}
