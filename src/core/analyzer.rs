//! 综合分析模块
//!
//! 负责把万岁历查询、干支解析、五行分析和神煞判定串起来，生成单次请求的分析结果。
//! 궁합和每日运势每次都重新完整分析，不缓存上一次的结果。

use crate::core::calendar::{parse_date, DateRange, DATE_FORMAT};
use crate::core::context::AnalysisContext;
use crate::core::elements::{combine_temperament, compatibility, element_of};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::ganzi::{day_stem, parse};
use crate::core::models::{
    AnalysisRecord, CompatibilityPet, CompatibilityReport, DailyFortune, DatasetStatus, Gender,
    PetProfile, PetRef, PillarsLookup,
};
use crate::core::shinsal::{summarize, ShinsalEngine};
use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};

/// 日干与当天日干相同时的运势
pub const FORTUNE_HIGH_ENERGY: &str = "오늘은 특히 컨디션이 좋고 활발한 하루가 될 것 같아요! 🌟";
/// 其余情况的运势
pub const FORTUNE_CALM: &str = "평온하고 안정적인 하루를 보낼 수 있을 것 같아요. 😊";

/// 宠物三柱分析器
pub struct PetAnalyzer {
    context: AnalysisContext,
    engine: ShinsalEngine,
}

impl PetAnalyzer {
    /// 创建新的分析器
    pub fn new(context: AnalysisContext) -> Self {
        Self {
            context,
            engine: ShinsalEngine::new(),
        }
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// 查询某天的三柱
    pub fn lookup_pillars(&self, date: &str) -> AnalysisResult<PillarsLookup> {
        let record = self.context.table.resolve(date)?;
        let pillars = parse(&record.pillar_notation)?;

        Ok(PillarsLookup {
            solar_date: record.date,
            solar_ganzi: record.pillar_notation.clone(),
            pillars,
            solar_term: record.solar_term.clone(),
        })
    }

    /// 可查询的日期范围
    pub fn available_range(&self) -> DateRange {
        self.context.table.available_range()
    }

    /// 按干支片段搜索日期
    pub fn search_by_pattern(&self, pattern: &str) -> Vec<NaiveDate> {
        self.context.table.search_by_pattern(pattern)
    }

    /// 数据集状态
    pub fn status(&self) -> DatasetStatus {
        DatasetStatus {
            record_count: self.context.table.len(),
            data_range: self.context.table.available_range(),
        }
    }

    /// 宠物登记与综合分析
    pub fn analyze(&self, profile: &PetProfile) -> AnalysisResult<AnalysisRecord> {
        // 1. 输入校验
        let (gender, birth_date) = self.validate(profile)?;

        // 2. 万岁历查询
        let record = self.context.table.resolve_date(birth_date)?;

        // 3. 干支解析，取日干
        let pillars = parse(&record.pillar_notation)?;
        let stem = day_stem(&pillars);

        // 4. 五行与性格
        let temperament = combine_temperament(stem, &profile.breed);

        // 5. 神煞
        let details = self.engine.evaluate(&pillars);
        let summary = summarize(&details);

        tracing::debug!(
            "分析完成: {} {} -> {} 日干={} 神煞={:?}",
            profile.name,
            birth_date,
            pillars,
            stem.hangul(),
            summary.active
        );

        Ok(AnalysisRecord {
            id: record_id(profile.name.trim(), birth_date),
            name: profile.name.trim().to_string(),
            breed: profile.breed.trim().to_string(),
            gender,
            birth_date,
            pillars,
            day_stem: stem.hangul().to_string(),
            five_element: temperament.five_element,
            temperament: temperament.temperament,
            activity_tip: temperament.activity_tip,
            shinsal: details.iter().collect(),
            shinsal_details: details,
            shinsal_summary: summary.summary,
            analysis_date: self.context.clock.now(),
            solar_term: record.solar_term.clone(),
        })
    }

    /// 两只宠物的五行궁합
    ///
    /// 只有生日影响结果，品种与性别使用固定值。
    pub fn compatibility(&self, first: &PetRef, second: &PetRef) -> AnalysisResult<CompatibilityReport> {
        let pet1 = self.analyze(&self.reference_profile(first, Gender::Male))?;
        let pet2 = self.analyze(&self.reference_profile(second, Gender::Female))?;

        let element1 = element_of(day_stem(&pet1.pillars));
        let element2 = element_of(day_stem(&pet2.pillars));

        Ok(CompatibilityReport {
            pet1: CompatibilityPet {
                name: pet1.name,
                element: pet1.five_element,
            },
            pet2: CompatibilityPet {
                name: pet2.name,
                element: pet2.five_element,
            },
            compatibility: compatibility(element1, element2),
            analysis_date: self.context.clock.now(),
        })
    }

    /// 每日运势：比较宠物日干与目标日期（默认今天）的日干
    pub fn daily_fortune(&self, pet: &PetRef, target_date: Option<&str>) -> AnalysisResult<DailyFortune> {
        let analysis = self.analyze(&self.reference_profile(pet, Gender::Male))?;

        let target = match target_date {
            Some(date) => parse_date("target_date", date)?,
            None => self.context.clock.today(),
        };

        let record = self.context.table.resolve_date(target)?;
        let daily_pillars = parse(&record.pillar_notation)?;

        let pet_stem = day_stem(&analysis.pillars);
        let today_stem = day_stem(&daily_pillars);
        let fortune_message = if pet_stem == today_stem {
            FORTUNE_HIGH_ENERGY
        } else {
            FORTUNE_CALM
        };

        Ok(DailyFortune {
            pet_name: analysis.name,
            target_date: target,
            pet_day_stem: pet_stem.hangul().to_string(),
            today_day_stem: today_stem.hangul().to_string(),
            fortune_message: fortune_message.to_string(),
            daily_pillars,
            solar_term: record.solar_term.clone(),
        })
    }

    fn reference_profile(&self, pet: &PetRef, gender: Gender) -> PetProfile {
        PetProfile {
            name: pet.name.clone(),
            breed: self.context.default_breed.clone(),
            gender: gender.to_string(),
            birth_date: pet.birth_date.clone(),
        }
    }

    /// 校验输入，返回解析后的性别与出生日期
    fn validate(&self, profile: &PetProfile) -> AnalysisResult<(Gender, NaiveDate)> {
        if profile.name.trim().is_empty() {
            return Err(AnalysisError::invalid("name", &profile.name, "name is required"));
        }

        if profile.breed.trim().is_empty() {
            return Err(AnalysisError::invalid("breed", &profile.breed, "breed is required"));
        }

        let gender: Gender = profile.gender.parse()?;
        let birth_date = parse_date("birth_date", &profile.birth_date)?;

        let policy = self.context.policy;
        if birth_date.year() < policy.min_year {
            return Err(AnalysisError::invalid(
                "birth_date",
                &profile.birth_date,
                format!("birth year must be {} or later", policy.min_year),
            ));
        }

        // 按年份比较：今年 + max_future_years 年内的任何日期都允许
        let today = self.context.clock.today();
        let latest_year = today.year().saturating_add_unsigned(policy.max_future_years);
        if birth_date.year() > latest_year {
            return Err(AnalysisError::invalid(
                "birth_date",
                &profile.birth_date,
                format!(
                    "birth year must be {} or earlier (today is {})",
                    latest_year,
                    today.format(DATE_FORMAT)
                ),
            ));
        }

        Ok((gender, birth_date))
    }
}

/// 稳定的记录ID：名字 + 生日的SHA-256前16字节
fn record_id(name: &str, birth_date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"|");
    hasher.update(birth_date.format(DATE_FORMAT).to_string().as_bytes());
    hex::encode(&hasher.finalize()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::{CalendarRow, CalendarTable};
    use crate::core::context::FixedClock;
    use crate::core::error::ErrorKind;
    use crate::core::ganzi::Stem;
    use std::sync::Arc;

    fn analyzer() -> PetAnalyzer {
        let table = CalendarTable::from_rows(vec![
            CalendarRow::new("2021-12-01", "辛丑年 己亥月 癸未日", ""),
            CalendarRow::new("2021-12-02", "辛丑年 己亥月 甲申日", ""),
            CalendarRow::new("2022-02-04", "壬寅年 辛丑月 甲申日", "입춘"),
            CalendarRow::new("2023-05-05", "癸卯年 丁巳月 broken", ""),
        ]);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        PetAnalyzer::new(
            AnalysisContext::new(Arc::new(table)).with_clock(Arc::new(FixedClock::new(today))),
        )
    }

    fn profile(birth_date: &str) -> PetProfile {
        PetProfile::new("콩이", "말티즈", "female", birth_date)
    }

    #[test]
    fn test_analyze_sample_date() {
        let record = analyzer().analyze(&profile("2021-12-01")).unwrap();

        assert_eq!(record.day_stem, "계");
        assert_eq!(day_stem(&record.pillars), Stem::Gye);
        assert_eq!(record.five_element, "수(水)");
        assert_eq!(record.gender, Gender::Female);
        assert!(record.temperament.contains("말티즈"));
        assert_eq!(record.shinsal["화개살"], true);
        assert_eq!(record.shinsal["역마살"], true);
        assert_eq!(record.shinsal["도화살"], false);
        assert_eq!(record.shinsal_details.len(), 5);
        assert_eq!(record.shinsal_details[0].name, "역마살");
        assert_eq!(record.id.len(), 32);
    }

    #[test]
    fn test_record_id_is_stable() {
        let analyzer = analyzer();
        let a = analyzer.analyze(&profile("2021-12-01")).unwrap();
        let b = analyzer.analyze(&profile("2021-12-01")).unwrap();
        let c = analyzer.analyze(&profile("2021-12-02")).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_required_fields() {
        let analyzer = analyzer();
        let cases = [
            PetProfile::new("  ", "말티즈", "male", "2021-12-01"),
            PetProfile::new("콩이", "", "male", "2021-12-01"),
            PetProfile::new("콩이", "말티즈", "unknown", "2021-12-01"),
            PetProfile::new("콩이", "말티즈", "male", "2021.12.01"),
        ];
        for case in cases {
            let err = analyzer.analyze(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{case:?}");
        }
    }

    #[test]
    fn test_birth_year_policy() {
        let analyzer = analyzer();

        let err = analyzer.analyze(&profile("1989-12-31")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // 今天 2026-10-18：2028 年超出，2027 年全年允许（万岁历中没有）
        let err = analyzer.analyze(&profile("2028-01-01")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = analyzer.analyze(&profile("2027-12-31")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // 下限年份本身允许
        let err = analyzer.analyze(&profile("1990-01-01")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_future_year_policy_at_year_end() {
        for today in ["2026-12-31", "2026-01-01"] {
            let today = NaiveDate::parse_from_str(today, DATE_FORMAT).unwrap();
            let analyzer = PetAnalyzer::new(
                analyzer()
                    .context()
                    .clone()
                    .with_clock(Arc::new(FixedClock::new(today))),
            );

            let err = analyzer.analyze(&profile("2027-12-31")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "{today}");

            let err = analyzer.analyze(&profile("2028-01-01")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{today}");
        }
    }

    #[test]
    fn test_non_canonical_dates_are_invalid_input() {
        let analyzer = analyzer();

        for bad in ["2021-12-1", " 2021-12-01", "+2021-12-01"] {
            let err = analyzer.analyze(&profile(bad)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{bad:?}");

            let err = analyzer
                .daily_fortune(&PetRef::new("콩이", "2021-12-01"), Some(bad))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{bad:?}");
        }
    }

    #[test]
    fn test_corrupt_notation_is_parse_error() {
        let err = analyzer().analyze(&profile("2023-05-05")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.kind().is_internal());
    }

    #[test]
    fn test_lookup_pillars() {
        let lookup = analyzer().lookup_pillars("2022-02-04").unwrap();
        assert_eq!(lookup.solar_ganzi, "壬寅年 辛丑月 甲申日");
        assert_eq!(lookup.pillars.to_string(), lookup.solar_ganzi);
        assert_eq!(lookup.solar_term, "입춘");

        assert_eq!(
            analyzer().lookup_pillars("2022-02-05").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_compatibility_uses_day_stems() {
        let report = analyzer()
            .compatibility(
                &PetRef::new("콩이", "2021-12-01"),
                &PetRef::new("보리", "2021-12-02"),
            )
            .unwrap();

        // 癸(水) 生 甲(木)
        assert_eq!(report.pet1.element, "수(水)");
        assert_eq!(report.pet2.element, "목(木)");
        assert_eq!(report.compatibility.relationship, "상생");
        assert_eq!(report.compatibility.compatibility, "매우 좋음");
    }

    #[test]
    fn test_daily_fortune_same_stem() {
        let fortune = analyzer()
            .daily_fortune(&PetRef::new("보리", "2021-12-02"), Some("2022-02-04"))
            .unwrap();
        assert_eq!(fortune.pet_day_stem, "갑");
        assert_eq!(fortune.today_day_stem, "갑");
        assert_eq!(fortune.fortune_message, FORTUNE_HIGH_ENERGY);
        assert_eq!(fortune.daily_pillars.to_string(), "壬寅年 辛丑月 甲申日");
        assert_eq!(fortune.solar_term, "입춘");
    }

    #[test]
    fn test_daily_fortune_different_stem() {
        let fortune = analyzer()
            .daily_fortune(&PetRef::new("콩이", "2021-12-01"), Some("2021-12-02"))
            .unwrap();
        assert_eq!(fortune.fortune_message, FORTUNE_CALM);
    }

    #[test]
    fn test_daily_fortune_missing_target_defaults_to_today() {
        // 固定时钟的今天不在数据表中
        let err = analyzer()
            .daily_fortune(&PetRef::new("콩이", "2021-12-01"), None)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NotFound {
                date: "2026-10-18".to_string()
            }
        );
    }
}
