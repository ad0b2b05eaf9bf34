//! Fixtures declared through the `testdeck` umbrella crate alone.

use serde_json::json;
use testdeck::prelude::*;

#[derive(Default, Parameterized)]
struct Greeting {
    #[param]
    name: String,
    greeted: bool,
}

#[fixture]
impl Greeting {
    #[before_each]
    fn greet(&mut self, context: &TestContext) {
        context.diagnostic(&format!("hello {}", self.name));
        self.greeted = true;
    }

    #[test_case]
    fn was_greeted(&self) -> Result<(), String> {
        if self.greeted {
            Ok(())
        } else {
            Err(format!("{} was not greeted", self.name))
        }
    }
}

#[tokio::test]
async fn umbrella_prelude_declares_and_runs_suites() {
    let mut runner = LocalRunner::new();
    ParameterizedSuite::<Greeting>::new()
        .properties(["name"])
        .run([json!("ada")])
        .run([json!("grace")])
        .with_config(SuiteConfig::new(None))
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    assert!(report.is_success());

    let second = report.suite("Greeting #1").unwrap();
    let test = second.test("was_greeted").unwrap();
    assert_eq!(test.outcome, TestOutcome::Passed);
    assert_eq!(test.diagnostics, ["hello grace"]);
}
