pub mod student_tree;
