//! Default run parameters for the InstructLab pipeline
//!
//! A small synthetic-data and training configuration: one node, one process,
//! one epoch per phase. Individual values can be overridden through
//! `PIPELINE_PARAMETERS`.

use ilab_core::domain::parameter::ParameterBag;

pub fn default_parameters() -> ParameterBag {
    ParameterBag::new()
        // Final evaluation
        .with("final_eval_batch_size", "auto")
        .with("final_eval_few_shots", 5)
        .with("final_eval_max_workers", "auto")
        .with("final_eval_merge_system_user_message", false)
        .with("k8s_storage_class_name", "nfs-csi")
        // MT-Bench
        .with("mt_bench_max_workers", "auto")
        .with("mt_bench_merge_system_user_message", false)
        // Synthetic data generation
        .with("sdg_base_model", "s3://rhods-dsp-dev/granite-7b-starter")
        .with("sdg_max_batch_len", 5000)
        .with("sdg_pipeline", "simple")
        .with("sdg_repo_branch", "")
        .with("sdg_repo_pr", 0)
        .with("sdg_repo_url", "https://github.com/instructlab/taxonomy.git")
        .with("sdg_sample_size", 0.00002)
        .with("sdg_scale_factor", 30)
        // Training
        .with("train_effective_batch_size_phase_1", 3840)
        .with("train_effective_batch_size_phase_2", 3840)
        .with("train_learning_rate_phase_1", 0.1)
        .with("train_learning_rate_phase_2", 0.1)
        .with("train_max_batch_len", 20000)
        .with("train_nnodes", 1)
        .with("train_nproc_per_node", 1)
        .with("train_num_epochs_phase_1", 1)
        .with("train_num_epochs_phase_2", 1)
        .with("train_num_warmup_steps_phase_1", 800)
        .with("train_num_warmup_steps_phase_2", 800)
        .with("train_save_samples", 0)
        .with("train_seed", 42)
}
