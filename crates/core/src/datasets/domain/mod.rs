pub mod face_box;
pub mod face_dataset;
pub mod image_loader;
pub mod label_vocabulary;
pub mod transform;
