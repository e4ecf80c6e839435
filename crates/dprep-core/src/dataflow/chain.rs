//! Secuencia persistente de steps (lista enlazada por la cola).
//!
//! Añadir un step crea un eslabón nuevo que apunta al anterior; el prefijo se
//! comparte entre todas las versiones y nunca se muta.

use std::sync::Arc;

use crate::step::Step;

#[derive(Debug)]
struct Link {
    step: Step,
    prev: Option<Arc<Link>>,
    len: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StepChain {
    tail: Option<Arc<Link>>,
}

impl StepChain {
    pub(crate) fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        steps.into_iter().fold(StepChain::default(), |chain, step| chain.push(step))
    }

    /// Nueva cadena con `step` al final; `self` queda intacta.
    pub(crate) fn push(&self, step: Step) -> Self {
        let len = self.len() + 1;
        StepChain { tail: Some(Arc::new(Link { step,
                                               prev: self.tail.clone(),
                                               len })) }
    }

    pub(crate) fn len(&self) -> usize {
        self.tail.as_ref().map_or(0, |l| l.len)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    pub(crate) fn last(&self) -> Option<&Step> {
        self.tail.as_deref().map(|l| &l.step)
    }

    /// Steps en orden de inserción.
    pub(crate) fn to_vec(&self) -> Vec<&Step> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.tail.as_deref();
        while let Some(link) = cursor {
            out.push(&link.step);
            cursor = link.prev.as_deref();
        }
        out.reverse();
        out
    }

    pub(crate) fn first(&self) -> Option<&Step> {
        let mut cursor = self.tail.as_deref()?;
        while let Some(prev) = cursor.prev.as_deref() {
            cursor = prev;
        }
        Some(&cursor.step)
    }

    /// `true` si `prefix` es literalmente (mismo eslabón) un prefijo de `self`.
    pub(crate) fn shares_prefix(&self, prefix: &StepChain) -> bool {
        let Some(target) = prefix.tail.as_ref() else { return true };
        let mut cursor = self.tail.as_ref();
        while let Some(link) = cursor {
            if link.len < target.len {
                return false;
            }
            if Arc::ptr_eq(link, target) {
                return true;
            }
            cursor = link.prev.as_ref();
        }
        false
    }
}

impl Drop for StepChain {
    // Evita recursión profunda al liberar cadenas largas.
    fn drop(&mut self) {
        let mut cursor = self.tail.take();
        while let Some(link) = cursor {
            match Arc::try_unwrap(link) {
                Ok(mut owned) => cursor = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::step::StepType;

    fn take(n: i64) -> Step {
        Step::new(StepType::Take, args! { "count" => n }).unwrap()
    }

    #[test]
    fn push_leaves_the_original_untouched() {
        let base = StepChain::from_steps([take(1), take(2)]);
        let ids: Vec<_> = base.to_vec().iter().map(|s| s.id()).collect();
        let extended = base.push(take(3));

        assert_eq!(base.len(), 2);
        assert_eq!(extended.len(), 3);
        assert_eq!(base.to_vec().iter().map(|s| s.id()).collect::<Vec<_>>(), ids);
        assert!(extended.shares_prefix(&base));
        assert!(!base.shares_prefix(&extended));
    }

    #[test]
    fn first_and_last_follow_insertion_order() {
        let a = take(1);
        let c = take(3);
        let chain = StepChain::from_steps([a.clone(), take(2), c.clone()]);
        assert_eq!(chain.first(), Some(&a));
        assert_eq!(chain.last(), Some(&c));
        assert!(StepChain::default().first().is_none());
    }

    #[test]
    fn long_chains_drop_without_overflow() {
        let chain = (0..100_000).fold(StepChain::default(), |c, i| c.push(take(i)));
        assert_eq!(chain.len(), 100_000);
        drop(chain);
    }
}
