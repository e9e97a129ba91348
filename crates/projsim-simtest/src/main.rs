//! ProjSim Headless Simulation Harness
//!
//! Runs scenario checks against the simulator and a bundled sample project.
//! Everything runs in-process with fixed seeds.
//!
//! Usage:
//!   cargo run -p projsim-simtest
//!   cargo run -p projsim-simtest -- --verbose
//!   cargo run -p projsim-simtest -- --project my_project.json --seed 7 --replicates 50 --rework

use projsim_core::batch::{run_batch, seed_range, BatchStatistics};
use projsim_core::description::ProjectDescription;
use projsim_core::prelude::*;

// ── Sample project (also used by the integration tests) ─────────────────
const SAMPLE_PROJECT_JSON: &str = include_str!("../../../data/sample_project.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: Option<u64>,
    replicates: usize,
    rework: bool,
    project: Option<String>,
}

impl Options {
    fn from_args() -> Result<Self, String> {
        let mut options = Options {
            verbose: false,
            seed: None,
            replicates: 20,
            rework: false,
            project: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" => options.verbose = true,
                "--rework" => options.rework = true,
                "--seed" => options.seed = Some(parse_value(&arg, args.next())?),
                "--replicates" => options.replicates = parse_value(&arg, args.next())?,
                "--project" => {
                    options.project = Some(args.next().ok_or("--project needs a path")?)
                }
                other => return Err(format!("unknown argument {other}")),
            }
        }
        Ok(options)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: cannot parse {value:?}"))
}

fn main() {
    let options = match Options::from_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    let verbose = options.verbose;
    println!("=== ProjSim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. End-to-end linear workflow
    results.extend(validate_linear_workflow(verbose));

    // 2. Rework
    results.extend(validate_rework(verbose));

    // 3. Workflow concurrency limit
    results.extend(validate_concurrency(verbose));

    // 4. PERT propagation
    results.extend(validate_pert(verbose));

    // 5. Allocation priority
    results.extend(validate_allocation_priority(verbose));

    // 6. Component error propagation
    results.extend(validate_component_errors(verbose));

    // 7. Project description + replicate batch
    results.extend(validate_project(&options));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn failure(name: &str, err: impl std::fmt::Display) -> Vec<TestResult> {
    vec![check(name, false, format!("error: {err}"))]
}

fn skills(names: &[&str], rate: f64) -> SkillTable {
    names
        .iter()
        .map(|n| (*n, Skill::with_work_rate(rate)))
        .collect()
}

// ── 1. Linear workflow ──────────────────────────────────────────────────

fn validate_linear_workflow(verbose: bool) -> Vec<TestResult> {
    println!("--- Linear Workflow ---");
    let cost_per_time = 4.0;

    let mut org = Organization::new();
    let team = org.add_team("team");
    org.add_worker(team, "solo", cost_per_time, skills(&["a", "b", "c"], 1.0));
    let mut wf = Workflow::new("chain", 0.0);
    let a = wf.add_task("a", 2.0, team);
    let b = wf.add_task("b", 3.0, team);
    let c = wf.add_task("c", 1.0, team);
    wf.add_dependency(a, b);
    wf.add_dependency(b, c);

    let project = match ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 1, 1)
    {
        Ok(p) => p,
        Err(e) => return failure("linear_build", e),
    };
    let mut sim = Simulator::new(project, SimulationConfig::default());
    let summary = match sim.execute() {
        Ok(s) => s,
        Err(e) => return failure("linear_execute", e),
    };

    if verbose {
        println!(
            "  duration {}, work {}, cost {}",
            summary.duration, summary.total_work_amount, summary.total_cost
        );
    }

    let tasks = &sim.project().instances[0].workflow.tasks;
    let starts: Vec<u32> = tasks.iter().map(|t| t.start_times[0]).collect();
    vec![
        check(
            "linear_duration",
            summary.duration == 6,
            format!("duration {} (expected 6)", summary.duration),
        ),
        check(
            "linear_total_work",
            summary.total_work_amount == 6.0,
            format!("work {} (expected 6)", summary.total_work_amount),
        ),
        check(
            "linear_total_cost",
            (summary.total_cost - 6.0 * cost_per_time).abs() < 1e-9,
            format!(
                "cost {} (expected {})",
                summary.total_cost,
                6.0 * cost_per_time
            ),
        ),
        check(
            "linear_start_order",
            starts == [0, 2, 5],
            format!("start times {:?}", starts),
        ),
    ]
}

// ── 2. Rework ───────────────────────────────────────────────────────────

fn validate_rework(verbose: bool) -> Vec<TestResult> {
    println!("--- Rework ---");

    let mut org = Organization::new();
    let team = org.add_team("team");
    org.add_worker(
        team,
        "sloppy",
        1.0,
        SkillTable::new().with("job", Skill::new(1.0, 1.0, 0.0)),
    );
    let mut wf = Workflow::new("rework", 0.0);
    let job = wf.add_task("job", 2.0, team);
    wf.task_mut(job).additional_work_amount = 4.0;
    let mut components = ComponentTree::new();
    let part = components.add("part", 0.0);
    let mut instance = WorkflowInstance::new(wf, components);
    instance.add_target(job, part);

    let project = match ProjectModel::new(org, instance, 1, 1) {
        Ok(p) => p,
        Err(e) => return failure("rework_build", e),
    };
    let mut sim = Simulator::new(project, SimulationConfig::default().with_rework(true));
    sim.initialize();
    let mut reworks = 0;
    while !sim.is_finished() {
        match sim.step() {
            Ok(report) => reworks += report.reworked.len(),
            Err(e) => return failure("rework_step", e),
        }
    }

    let task = &sim.project().instances[0].workflow.tasks[0];
    if verbose {
        println!(
            "  reworks {}, actual work {}, finish {:?}",
            reworks, task.actual_work_amount, task.finish_times
        );
    }
    vec![
        check(
            "rework_fires_once",
            reworks == 1 && task.rework_done,
            format!("{} rework transitions", reworks),
        ),
        check(
            "rework_adds_work",
            task.actual_work_amount == 6.0,
            format!("actual work {} (expected 6)", task.actual_work_amount),
        ),
        check(
            "rework_finishes",
            task.is_finished() && task.finish_times == [6],
            format!("state {:?}, finish times {:?}", task.state, task.finish_times),
        ),
    ]
}

// ── 3. Concurrency limit ────────────────────────────────────────────────

fn replicated_project(limit: usize) -> Result<ProjectModel, ModelError> {
    let mut org = Organization::new();
    let team = org.add_team("team");
    org.add_worker(team, "w0", 1.0, skills(&["job"], 1.0));
    org.add_worker(team, "w1", 1.0, skills(&["job"], 1.0));
    let mut wf = Workflow::new("single", 0.0);
    wf.add_task("job", 2.0, team);
    ProjectModel::new(org, WorkflowInstance::new(wf, ComponentTree::new()), 2, limit)
}

fn validate_concurrency(verbose: bool) -> Vec<TestResult> {
    println!("--- Concurrency Limit ---");
    let mut results = Vec::new();

    for limit in [1, 2] {
        let project = match replicated_project(limit) {
            Ok(p) => p,
            Err(e) => return failure("concurrency_build", e),
        };
        let mut sim = Simulator::new(project, SimulationConfig::default());
        if let Err(e) = sim.execute() {
            return failure("concurrency_execute", e);
        }
        let p = sim.project();
        let first = &p.instances[0].workflow.tasks[0];
        let second = &p.instances[1].workflow.tasks[0];
        if verbose {
            println!(
                "  limit {}: starts {:?} / {:?}",
                limit, first.start_times, second.start_times
            );
        }

        let passed = if limit == 1 {
            second.start_times[0] >= first.finish_times[0]
        } else {
            first.start_times[0] == 0 && second.start_times[0] == 0
        };
        results.push(check(
            &format!("concurrency_limit_{limit}"),
            passed,
            format!(
                "second instance started at {}, first finished at {}",
                second.start_times[0], first.finish_times[0]
            ),
        ));
    }
    results
}

// ── 4. PERT ─────────────────────────────────────────────────────────────

fn validate_pert(verbose: bool) -> Vec<TestResult> {
    println!("--- PERT ---");

    let mut wf = Workflow::new("pert", 0.0);
    let a = wf.add_task("a", 5.0, TeamId(0));
    let b = wf.add_task("b", 3.0, TeamId(0));
    let c = wf.add_task("c", 2.0, TeamId(0));
    wf.add_dependency(a, b);
    wf.add_dependency(a, c);
    wf.initialize();
    wf.update_pert(0);

    let (ta, tb, tc) = (wf.task(a), wf.task(b), wf.task(c));
    if verbose {
        println!(
            "  a est {} lst {}, b est {} lst {}, c est {} lst {}",
            ta.est, ta.lst, tb.est, tb.lst, tc.est, tc.lst
        );
    }
    vec![
        check(
            "pert_forward",
            tb.est == ta.est + 5.0 && tc.est == ta.est + 5.0,
            format!("b.est {} c.est {} (a.est {})", tb.est, tc.est, ta.est),
        ),
        check(
            "pert_critical_path",
            wf.critical_path_length == 8.0,
            format!("critical path {}", wf.critical_path_length),
        ),
        check(
            "pert_slack",
            tb.slack() == 0.0 && tc.slack() == 1.0,
            format!("b slack {} c slack {}", tb.slack(), tc.slack()),
        ),
    ]
}

// ── 5. Allocation priority ──────────────────────────────────────────────

fn validate_allocation_priority(verbose: bool) -> Vec<TestResult> {
    println!("--- Allocation Priority ---");

    let mut org = Organization::new();
    let team = org.add_team("team");
    org.add_worker(team, "only", 1.0, skills(&["job"], 1.0));
    let mut late = Workflow::new("late", 10.0);
    late.add_task("job", 1.0, team);
    let mut soon = Workflow::new("soon", 5.0);
    soon.add_task("job", 1.0, team);

    let project = match ProjectModel::from_instances(
        org,
        vec![
            WorkflowInstance::new(late, ComponentTree::new()),
            WorkflowInstance::new(soon, ComponentTree::new()),
        ],
        2,
    ) {
        Ok(p) => p,
        Err(e) => return failure("priority_build", e),
    };
    let mut sim = Simulator::new(project, SimulationConfig::default());
    sim.initialize();
    let report = match sim.step() {
        Ok(r) => r,
        Err(e) => return failure("priority_step", e),
    };
    if verbose {
        println!("  started at tick 0: {:?}", report.started);
    }
    vec![check(
        "priority_due_date",
        report.started == [TaskRef::new(1, TaskId(0))],
        format!("started {:?}", report.started),
    )]
}

// ── 6. Component errors ─────────────────────────────────────────────────

fn validate_component_errors(verbose: bool) -> Vec<TestResult> {
    println!("--- Component Errors ---");

    let mut tree = ComponentTree::new();
    let top = tree.add("top", 4.0);
    let mid = tree.add("mid", 2.0);
    let leaf = tree.add("leaf", 10.0);
    tree.add_dependency(top, mid);
    tree.add_dependency(mid, leaf);
    tree.get_mut(top).error = 1.0;
    tree.get_mut(mid).error = 2.0;
    tree.get_mut(leaf).error = 3.0;

    if verbose {
        println!(
            "  totals: top {} mid {} leaf {}",
            tree.total_error(top),
            tree.total_error(mid),
            tree.total_error(leaf)
        );
    }
    let totals = (
        tree.total_error(top),
        tree.total_error(mid),
        tree.total_error(leaf),
    );
    let over = tree.is_over_tolerance(top) && !tree.is_over_tolerance(leaf);
    tree.reset_error(top);
    let reset = tree.iter().all(|c| c.error == 0.0);
    vec![
        check(
            "component_total_error",
            totals == (6.0, 5.0, 3.0),
            format!("totals {:?} (expected (6, 5, 3))", totals),
        ),
        check(
            "component_tolerance",
            over,
            "top exceeds tolerance 4, leaf stays within 10".into(),
        ),
        check(
            "component_reset",
            reset,
            "reset clears the whole dependency chain".into(),
        ),
    ]
}

// ── 7. Project description and batch ────────────────────────────────────

fn validate_project(options: &Options) -> Vec<TestResult> {
    println!("--- Project ---");
    let mut results = Vec::new();

    let loaded = match &options.project {
        Some(path) => ProjectDescription::load(path),
        None => ProjectDescription::from_json(SAMPLE_PROJECT_JSON),
    };
    let desc = match loaded {
        Ok(d) => d,
        Err(e) => return failure("project_load", e),
    };
    let mut config = desc.simulation_config();
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if options.rework {
        config = config.with_rework(true);
    }
    let project = match desc.build() {
        Ok(p) => p,
        Err(e) => return failure("project_build", e),
    };
    results.push(check(
        "project_build",
        true,
        format!(
            "{:?}: {} instances, {} tasks, {} resources",
            desc.name,
            project.instances.len(),
            project.task_count(),
            project.organization.resources.len()
        ),
    ));

    let report = match run(project.clone(), config.clone()) {
        Ok(r) => r,
        Err(e) => return failure("project_run", e),
    };
    let summary = report.summary;
    if options.verbose {
        println!(
            "  seed {}: cost {:.2}, duration {}, work {:.2}, {} reworked",
            config.seed,
            summary.total_cost,
            summary.duration,
            summary.total_work_amount,
            report.reworked_tasks().count()
        );
        for w in &report.workflows {
            println!(
                "    instance {} finished at {:?} (critical path {:.2})",
                w.instance, w.finish_time, w.critical_path_length
            );
        }
    }
    results.push(check(
        "project_completes",
        report.tasks.iter().all(|t| t.state == TaskState::Finished),
        format!("duration {}, cost {:.2}", summary.duration, summary.total_cost),
    ));

    let json_ok = report
        .to_json()
        .ok()
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .is_some_and(|v| v.get("summary").is_some());
    results.push(check(
        "project_report_json",
        json_ok,
        "report serializes to JSON".into(),
    ));

    let seeds = seed_range(config.seed, options.replicates);
    let batch = match run_batch(&project, &config, &seeds) {
        Ok(b) => b,
        Err(e) => {
            results.extend(failure("project_batch", e));
            return results;
        }
    };
    match BatchStatistics::from_results(&batch) {
        Some(stats) => {
            if options.verbose {
                println!(
                    "  batch of {}: duration {:.1}..{:.1} (mean {:.2}), cost mean {:.2}",
                    stats.runs,
                    stats.duration.min,
                    stats.duration.max,
                    stats.duration.mean,
                    stats.total_cost.mean
                );
            }
            results.push(check(
                "project_batch",
                stats.runs == options.replicates && stats.duration.min > 0.0,
                format!("{} replicates, mean duration {:.2}", stats.runs, stats.duration.mean),
            ));
        }
        None => results.push(check(
            "project_batch",
            options.replicates == 0,
            "no replicates run".into(),
        )),
    }
    results
}
