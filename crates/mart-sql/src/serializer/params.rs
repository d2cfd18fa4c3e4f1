/// Collects bind values as placeholders are written.
pub trait Params {
    fn push(&mut self, value: &str);
}

impl Params for Vec<String> {
    fn push(&mut self, value: &str) {
        Vec::push(self, value.to_string());
    }
}
