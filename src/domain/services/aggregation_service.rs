// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::category::{CategorySets, TargetResult};

/// 聚合服务
///
/// 将爬取语料、归档语料和补充采集的分类结果按类别求并集。
/// 相同字符串无论来源如何只保留一次。
pub struct AggregationService;

impl AggregationService {
    /// 合并若干分类结果
    ///
    /// # 参数
    ///
    /// * `parts` - 各来源的分类结果
    ///
    /// # 返回值
    ///
    /// 合并后的目标结果
    pub fn merge<'a, I>(parts: I) -> TargetResult
    where
        I: IntoIterator<Item = &'a CategorySets>,
    {
        let mut merged = CategorySets::new();
        for part in parts {
            merged.extend(part);
        }
        TargetResult::new(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::category::Category;

    fn sample(tokens: &[(Category, &str)]) -> CategorySets {
        let mut sets = CategorySets::new();
        for (category, token) in tokens {
            sets.insert(*category, token);
        }
        sets
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = sample(&[(Category::QueryParameter, "id"), (Category::Subdomain, "a.example.com")]);
        let b = sample(&[(Category::QueryParameter, "q"), (Category::Fragment, "top")]);

        assert_eq!(
            AggregationService::merge([&a, &b]),
            AggregationService::merge([&b, &a])
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = sample(&[(Category::PathSegment, "admin"), (Category::ApiEndpointPath, "users")]);
        let merged = AggregationService::merge([&a, &a]);
        assert_eq!(merged.sets(), &a);
    }

    #[test]
    fn test_same_token_from_different_sources_is_kept_once() {
        let crawl = sample(&[(Category::QueryParameter, "token")]);
        let archive = sample(&[(Category::QueryParameter, "token ")]);
        let enrichment = sample(&[(Category::PostParameterName, "token")]);

        let merged = AggregationService::merge([&crawl, &archive, &enrichment]);
        assert_eq!(merged.tokens(Category::QueryParameter).len(), 1);
        assert_eq!(merged.tokens(Category::PostParameterName).len(), 1);
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = AggregationService::merge(std::iter::empty());
        assert!(merged.sets().is_empty());
    }
}
