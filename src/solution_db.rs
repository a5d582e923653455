//! 조제에 사용하는 포도당 원액(stock) 테이블과 사용 가능 여부 선택을 제공한다.
//! 농도는 w/v 분율(0~1)이며, 물에 녹인 포도당이므로 g/ml 값이 농도와 같다.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DextroseSolution {
    pub name: &'static str,
    /// 농도(분율, 0.0~1.0)
    pub concentration: f64,
    /// ml 당 포도당 g
    pub grams_per_ml: f64,
}

impl DextroseSolution {
    pub const fn new(name: &'static str, concentration: f64) -> Self {
        Self {
            name,
            concentration,
            grams_per_ml: concentration,
        }
    }
}

const SOLUTIONS: &[DextroseSolution] = &[
    DextroseSolution::new("D50W", 0.50),
    DextroseSolution::new("D25W", 0.25),
    DextroseSolution::new("D10W", 0.10),
    DextroseSolution::new("D5W", 0.05),
    DextroseSolution::new("Sterile Water", 0.00),
];

/// 전체 원액 목록(고농도 → 저농도 순).
pub fn solutions() -> &'static [DextroseSolution] {
    SOLUTIONS
}

pub fn find_solution(name: &str) -> Option<&'static DextroseSolution> {
    SOLUTIONS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

/// 사용자가 체크한 원액 이름 집합.
///
/// 이름은 테이블의 정식 표기로 정규화해 저장한다. 테이블에 없는 이름은 무시한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SolutionSelection(BTreeSet<String>);

impl From<Vec<String>> for SolutionSelection {
    fn from(value: Vec<String>) -> Self {
        Self::from_names(value)
    }
}

impl From<SolutionSelection> for Vec<String> {
    fn from(value: SolutionSelection) -> Self {
        value.0.into_iter().collect()
    }
}

impl Default for SolutionSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl SolutionSelection {
    pub fn all() -> Self {
        Self(SOLUTIONS.iter().map(|s| s.name.to_string()).collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::none();
        for name in names {
            selection.insert(name.as_ref());
        }
        selection
    }

    /// 원액을 추가한다. 알 수 없는 이름이면 false.
    pub fn insert(&mut self, name: &str) -> bool {
        match find_solution(name) {
            Some(s) => {
                self.0.insert(s.name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) {
        if let Some(s) = find_solution(name) {
            self.0.remove(s.name);
        }
    }

    /// 체크 상태를 뒤집고 변경 후 상태(선택 여부)를 반환한다.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.remove(name);
            false
        } else {
            self.insert(name)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        find_solution(name).is_some_and(|s| self.0.contains(s.name))
    }

    pub fn is_empty(&self) -> bool {
        enabled_solutions(self).is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// 선택된 원액만 걸러 농도 내림차순으로 정렬해 반환한다.
pub fn enabled_solutions(selection: &SolutionSelection) -> Vec<&'static DextroseSolution> {
    let mut enabled: Vec<_> = SOLUTIONS
        .iter()
        .filter(|s| selection.0.contains(s.name))
        .collect();
    enabled.sort_by(|a, b| b.concentration.total_cmp(&a.concentration));
    enabled
}
