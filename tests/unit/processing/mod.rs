//! Normalization and binarization tests

mod test_monochrome;
