use criterion::{black_box, criterion_group, criterion_main, Criterion};

use projsim_core::batch::{run_batch, seed_range};
use projsim_core::prelude::*;

/// Layered DAG: `layers` x `width` tasks, each task depending on every task
/// of the previous layer. Two teams split the layers.
fn layered_project(layers: usize, width: usize, replicates: usize) -> ProjectModel {
    let mut org = Organization::new();
    let teams = [org.add_team("even"), org.add_team("odd")];
    for (t, &team) in teams.iter().enumerate() {
        for w in 0..width {
            let skills: SkillTable = (0..layers)
                .filter(|l| l % 2 == t)
                .flat_map(|l| (0..width).map(move |i| format!("l{l}t{i}")))
                .map(|name| (name, Skill::new(1.0 + w as f64 * 0.25, 0.02, 0.0)))
                .collect();
            org.add_worker(team, format!("w{t}-{w}"), 10.0, skills);
        }
    }

    let mut wf = Workflow::new("layered", 100.0);
    let mut components = ComponentTree::new();
    let mut previous: Vec<TaskId> = Vec::new();
    let mut previous_component: Option<ComponentId> = None;
    let mut targets = Vec::new();
    for l in 0..layers {
        let component = components.add(format!("c{l}"), 1.0);
        if let Some(prev) = previous_component {
            components.add_dependency(component, prev);
        }
        previous_component = Some(component);

        let layer: Vec<TaskId> = (0..width)
            .map(|i| {
                let id = wf.add_task(format!("l{l}t{i}"), 2.0 + i as f64, teams[l % 2]);
                wf.task_mut(id).additional_work_amount = 1.0;
                id
            })
            .collect();
        for &succ in &layer {
            for &pred in &previous {
                wf.add_dependency(pred, succ);
            }
            targets.push((succ, component));
        }
        previous = layer;
    }

    let mut instance = WorkflowInstance::new(wf, components);
    for (task, component) in targets {
        instance.add_target(task, component);
    }
    ProjectModel::new(org, instance, replicates, 2).unwrap()
}

fn bench_single_run(c: &mut Criterion) {
    let project = layered_project(10, 5, 4);
    let config = SimulationConfig::default().with_rework(true);
    let mut sim = Simulator::new(project, config);

    c.bench_function("execute_10x5_layers_4_replicates", |b| {
        b.iter(|| black_box(sim.execute().unwrap()));
    });
}

fn bench_pert_update(c: &mut Criterion) {
    let mut project = layered_project(20, 8, 1);
    project.initialize();
    let workflow = &mut project.instances[0].workflow;

    c.bench_function("update_pert_20x8_layers", |b| {
        b.iter(|| workflow.update_pert(black_box(0)));
    });
}

fn bench_batch(c: &mut Criterion) {
    let project = layered_project(8, 4, 2);
    let config = SimulationConfig::default().with_rework(true);
    let seeds = seed_range(0, 32);

    c.bench_function("run_batch_32_seeds", |b| {
        b.iter(|| black_box(run_batch(&project, &config, &seeds).unwrap()));
    });
}

criterion_group!(benches, bench_single_run, bench_pert_update, bench_batch);
criterion_main!(benches);
