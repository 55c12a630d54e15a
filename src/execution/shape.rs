/// Ordered, finite domain driving a bulk operation.
///
/// Implemented for anything that iterates in a fixed order: integer ranges of
/// any width, `Vec`, arrays, adapted iterators. The iterator must end; an
/// unbounded one keeps submitting work.
pub trait Shape {
    type Element: Send + 'static;
    type Elements: Iterator<Item = Self::Element>;

    fn into_elements(self) -> Self::Elements;
}

impl<S> Shape for S
where
    S: IntoIterator,
    S::Item: Send + 'static,
{
    type Element = S::Item;
    type Elements = S::IntoIter;

    fn into_elements(self) -> Self::Elements {
        self.into_iter()
    }
}
