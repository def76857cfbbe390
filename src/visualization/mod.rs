pub mod brsim_vis3d;
