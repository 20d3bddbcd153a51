//! End-to-end tests: agents, policies, plans and the runner together

#[cfg(test)]
mod tests {
    use crate::{
        Agent, OrchestrationError, Plan, PlanInputs, PlanRunner, PolicySet, RetryPolicy,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Agent that counts its invocations
    fn counting<F>(name: &str, calls: Arc<AtomicUsize>, f: F) -> Agent<String, String>
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        Agent::from_function(name, move |s: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(f(s))
        })
    }

    #[tokio::test]
    async fn scenario_linear_pipeline() {
        let processor = Agent::from_function("processor", |s: String| Ok(s.to_uppercase()));
        let summarizer = Agent::from_function("summarizer", |s: String| {
            Ok(format!("summary of '{}' ({} words)", s, s.split_whitespace().count()))
        });

        let plan = Plan::builder()
            .node("processor", processor)
            .node("summarizer", summarizer)
            .edge("processor", "summarizer")
            .build()
            .unwrap();

        let outputs = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("processor", "hello world".to_string()))
            .await
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs.get::<String>("processor").unwrap(), "HELLO WORLD");
        assert_eq!(
            outputs.get::<String>("summarizer").unwrap(),
            "summary of 'HELLO WORLD' (2 words)"
        );
    }

    #[tokio::test]
    async fn scenario_independent_nodes() {
        let plan = Plan::builder()
            .node("left", Agent::from_function("left", |n: i32| Ok(n + 1)))
            .node("right", Agent::from_function("right", |n: i32| Ok(n * 2)))
            .build()
            .unwrap();

        let outputs = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("left", 1i32).with("right", 21i32))
            .await
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs.get::<i32>("left"), Some(&2));
        assert_eq!(outputs.get::<i32>("right"), Some(&42));
    }

    #[tokio::test]
    async fn scenario_upstream_failure_stops_dependents() {
        let downstream_calls = Arc::new(AtomicUsize::new(0));
        let plan = Plan::builder()
            .node("first", Agent::<String, String>::always_fail("first", "upstream broke"))
            .node(
                "second",
                counting("second", downstream_calls.clone(), |s| s),
            )
            .edge("first", "second")
            .build()
            .unwrap();

        let result = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("first", "input".to_string()))
            .await;

        match result {
            Err(OrchestrationError::NodeExecution { node_id, message, .. }) => {
                assert_eq!(node_id, "first");
                assert_eq!(message, "upstream broke");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(downstream_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenario_missing_root_input() {
        let calls = Arc::new(AtomicUsize::new(0));
        let plan = Plan::builder()
            .node("lonely", counting("lonely-agent", calls.clone(), |s| s))
            .build()
            .unwrap();

        let err = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("someone-else", "x".to_string()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestrationError::NodeExecution {
                node_id: "lonely".to_string(),
                agent_name: "lonely-agent".to_string(),
                message: "missing input".to_string(),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_combined_policies_prefer_own_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let flaky = Agent::from_async("flaky", move |s: String| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(OrchestrationError::node_execution("flaky", "transient"))
                } else {
                    Ok(format!("own:{}", s))
                }
            }
        });

        let policies = PolicySet::new()
            .retry(RetryPolicy::fixed(3, Duration::from_millis(10)))
            .timeout(Duration::from_secs(1))
            .fallback(Agent::constant("F", "fallback".to_string()));

        let plan = Plan::builder()
            .node("work", flaky.with_policies(policies))
            .build()
            .unwrap();

        let outputs = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("work", "x".to_string()))
            .await
            .unwrap();

        assert_eq!(outputs.get::<String>("work").unwrap(), "own:x");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_inside_plan_names_the_node() {
        let slow = Agent::from_async("slow", |s: String| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(s)
        });

        let plan = Plan::builder()
            .node("fetch", slow.timing_out(Duration::from_millis(200)))
            .build()
            .unwrap();

        let err = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("fetch", String::new()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestrationError::AgentTimeout {
                node_id: "fetch".to_string(),
                duration: Duration::from_millis(200),
            }
        );
    }

    #[tokio::test]
    async fn downstream_receives_exact_upstream_output() {
        let seen: Arc<Mutex<Vec<(String, u64)>>> = Arc::new(Mutex::new(Vec::new()));

        let recorder = |name: &'static str, seen: Arc<Mutex<Vec<(String, u64)>>>| {
            Agent::from_function(name, move |n: u64| {
                seen.lock().unwrap().push((name.to_string(), n));
                Ok(n.wrapping_mul(31).wrapping_add(7))
            })
        };

        // a -> b -> d, a -> c, plus an unrelated chain x -> y
        let plan = Plan::builder()
            .node("a", recorder("a", seen.clone()))
            .node("b", recorder("b", seen.clone()))
            .node("c", recorder("c", seen.clone()))
            .node("d", recorder("d", seen.clone()))
            .node("x", recorder("x", seen.clone()))
            .node("y", recorder("y", seen.clone()))
            .edge("a", "b")
            .edge("a", "c")
            .edge("b", "d")
            .edge("x", "y")
            .build()
            .unwrap();

        let outputs = PlanRunner::new()
            .execute(&plan, PlanInputs::new().with("a", 3u64).with("x", 11u64))
            .await
            .unwrap();

        assert_eq!(outputs.len(), 6);
        let inputs: std::collections::HashMap<String, u64> =
            seen.lock().unwrap().iter().cloned().collect();
        for node in ["b", "c", "d", "y"] {
            let parent = plan.parent(node).unwrap();
            assert_eq!(inputs[node], *outputs.get::<u64>(parent).unwrap());
        }
    }

    #[tokio::test]
    async fn cyclic_plan_never_reaches_runner() {
        let result = Plan::builder()
            .node("a", Agent::from_function("a", |s: String| Ok(s)))
            .node("b", Agent::from_function("b", |s: String| Ok(s)))
            .edge("a", "b")
            .edge("b", "a")
            .build();

        assert!(matches!(result, Err(OrchestrationError::PlanValidation { .. })));
    }

    #[tokio::test]
    async fn plan_is_reusable_across_runs() {
        let plan = Plan::builder()
            .node("echo", Agent::from_function("echo", |s: String| Ok(s)))
            .build()
            .unwrap();
        let runner = PlanRunner::new();

        let (one, two) = tokio::join!(
            runner.execute(&plan, PlanInputs::new().with("echo", "one".to_string())),
            runner.execute(&plan, PlanInputs::new().with("echo", "two".to_string())),
        );

        assert_eq!(one.unwrap().get::<String>("echo").unwrap(), "one");
        assert_eq!(two.unwrap().get::<String>("echo").unwrap(), "two");
    }
}
